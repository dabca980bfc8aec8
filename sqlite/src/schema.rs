//! Table definitions and the ordered list of schema migrations.
//!
//! The catalog lives in two tables:
//!
//! - `books` — one row per catalog entry, optionally owned by a user
//! - `users` — accounts for the multi-user variant
//!
//! Rather than probing for individual columns at startup, the schema is
//! evolved through [`MIGRATIONS`], a fixed sequence of named steps. Each
//! step is idempotent on its own (tables use `IF NOT EXISTS`, columns go
//! through [`ensure_column`]) so a database created by an older build, with
//! only the original `books` columns, upgrades in place without losing rows.
//! Applied step names are recorded in `schema_migrations`.

use rusqlite::{Connection, params};

use crate::error::{Result, StoreError};

/// Bookkeeping table recording which migrations have run.
pub(crate) const MIGRATIONS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    name TEXT PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// One named, idempotent schema change.
pub(crate) struct MigrationStep {
    /// Unique, sortable name recorded in `schema_migrations`.
    pub name: &'static str,
    /// Applies the change. Runs inside the caller's transaction.
    pub apply: fn(&Connection) -> Result<()>,
}

/// Every schema change, in application order.
pub(crate) const MIGRATIONS: &[MigrationStep] = &[
    MigrationStep {
        name: "0001_create_books",
        apply: create_books,
    },
    MigrationStep {
        name: "0002_create_users",
        apply: create_users,
    },
    MigrationStep {
        name: "0003_books_rating_review_cover",
        apply: add_reading_columns,
    },
    MigrationStep {
        name: "0004_books_owner",
        apply: add_owner_column,
    },
    MigrationStep {
        name: "0005_legacy_web_columns",
        apply: adopt_legacy_web_columns,
    },
];

fn create_books(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (title <> ''),
    author TEXT NOT NULL CHECK (author <> ''),
    year INTEGER NOT NULL,
    genre TEXT NOT NULL CHECK (genre <> ''),
    read_status INTEGER NOT NULL
);
"#,
    )?;
    Ok(())
}

fn create_users(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE CHECK (username <> ''),
    password_hash TEXT NOT NULL
);
"#,
    )?;
    Ok(())
}

fn add_reading_columns(conn: &Connection) -> Result<()> {
    ensure_column(conn, "books", "rating", "INTEGER")?;
    ensure_column(conn, "books", "review", "TEXT")?;
    ensure_column(conn, "books", "cover_image", "BLOB")?;
    Ok(())
}

fn add_owner_column(conn: &Connection) -> Result<()> {
    ensure_column(conn, "books", "owner_id", "INTEGER REFERENCES users(id)")?;
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_books_owner ON books(owner_id);")?;
    Ok(())
}

/// Carries over a database written by the multi-user web program, which
/// stored digests in `users.password` and ownership in `books.user_id`.
fn adopt_legacy_web_columns(conn: &Connection) -> Result<()> {
    if column_exists(conn, "users", "password")? && !column_exists(conn, "users", "password_hash")? {
        conn.execute_batch("ALTER TABLE users RENAME COLUMN password TO password_hash;")?;
        tracing::info!("renamed users.password to password_hash");
    }
    if column_exists(conn, "books", "user_id")? {
        let adopted = conn.execute(
            "UPDATE books SET owner_id = user_id WHERE owner_id IS NULL AND user_id IS NOT NULL",
            [],
        )?;
        tracing::info!(adopted, "copied books.user_id into owner_id");
    }
    Ok(())
}

/// SQL dropping every catalog table, dependents first.
pub(crate) const DROP_SQL: &str = r#"
DROP INDEX IF EXISTS idx_books_owner;
DROP TABLE IF EXISTS books;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS schema_migrations;
"#;

/// Validates that an identifier contains only alphanumeric characters and
/// underscores, so it can be interpolated into DDL.
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Returns `true` if a table named `table` exists.
pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Returns `true` if `table` has a column named `column`.
pub(crate) fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    validate_identifier(table)?;
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|name| name == column))
}

/// Adds `column` to `table` unless it is already there.
///
/// Existing rows receive the column's default (`NULL` unless `decl` says
/// otherwise). Returns `true` when the column was added.
///
/// # Errors
///
/// Returns [`StoreError::InvalidIdentifier`] for unsafe table or column
/// names and [`StoreError::Migration`] if the table does not exist.
pub(crate) fn ensure_column(
    conn: &Connection,
    table: &str,
    column: &str,
    decl: &str,
) -> Result<bool> {
    validate_identifier(table)?;
    validate_identifier(column)?;

    if !table_exists(conn, table)? {
        return Err(StoreError::Migration(format!(
            "cannot add column '{column}': table '{table}' does not exist"
        )));
    }
    if column_exists(conn, table, column)? {
        return Ok(false);
    }

    conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl};"))?;
    tracing::debug!(table, column, "added column");
    Ok(true)
}
