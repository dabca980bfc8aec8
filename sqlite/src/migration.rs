//! Migration lifecycle operations for the catalog schema.
//!
//! Provides [`Migration`] for applying the ordered schema steps, adding
//! columns on demand, reporting status and dropping everything. Each step
//! runs in its own transaction together with its `schema_migrations` row,
//! so a failure never leaves a step half-applied.
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("library.db").unwrap();
//! let mut migration = Migration::new(conn).unwrap();
//!
//! // Create or upgrade tables
//! let applied = migration.up().unwrap();
//! println!("applied {} migration(s)", applied.len());
//!
//! // Check status
//! let status = migration.status().unwrap();
//! assert!(status.tables_exist);
//! assert!(status.pending.is_empty());
//! ```

use std::collections::HashSet;

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::schema::{self, DROP_SQL, MIGRATIONS, MIGRATIONS_TABLE_SQL};

/// Manages the lifecycle of the catalog tables.
///
/// Provides operations to bring the schema up to date ([`up`](Self::up)),
/// evolve individual tables ([`ensure_column`](Self::ensure_column)), drop
/// everything ([`down`](Self::down)) and inspect the current state
/// ([`status`](Self::status)).
pub struct Migration {
    conn: Connection,
}

impl Migration {
    /// Creates a migration manager for the given connection.
    ///
    /// Enables foreign key enforcement on the connection.
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Applies every pending migration in order.
    ///
    /// Safe to call on every startup: already-applied steps are skipped and
    /// each step is itself idempotent. Returns the names of the steps applied
    /// by this call.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Migration`] naming the failing step. Steps
    /// applied before the failure stay committed.
    pub fn up(&mut self) -> Result<Vec<&'static str>> {
        self.conn
            .execute_batch(MIGRATIONS_TABLE_SQL)
            .map_err(|e| StoreError::Migration(format!("failed to create migrations table: {e}")))?;

        let done = self.applied_names()?;
        let mut applied = Vec::new();

        for step in MIGRATIONS {
            if done.contains(step.name) {
                debug!(migration = step.name, "already applied");
                continue;
            }

            let tx = self.conn.transaction()?;
            (step.apply)(&tx).map_err(|e| {
                StoreError::Migration(format!("migration {} failed: {e}", step.name))
            })?;
            tx.execute(
                "INSERT INTO schema_migrations (name) VALUES (?1)",
                params![step.name],
            )?;
            tx.commit()?;

            info!(migration = step.name, "applied migration");
            applied.push(step.name);
        }

        Ok(applied)
    }

    /// Adds a column to `table` if it is missing, preserving all rows.
    ///
    /// Returns `true` when the column was added. Runs in a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`] if `table` or `column`
    /// contain characters other than alphanumerics and underscores.
    pub fn ensure_column(&mut self, table: &str, column: &str, decl: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let added = schema::ensure_column(&tx, table, column, decl)?;
        tx.commit()?;
        Ok(added)
    }

    /// Drops all catalog tables and the migration history.
    ///
    /// Uses `DROP TABLE IF EXISTS` so it is safe to call even if tables
    /// do not exist. Executes within a transaction for atomicity.
    pub fn down(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(DROP_SQL)
            .map_err(|e| StoreError::Migration(format!("failed to drop tables: {e}")))?;
        tx.commit()?;
        info!("dropped catalog tables");
        Ok(())
    }

    /// Returns the current status of the schema.
    pub fn status(&self) -> Result<MigrationStatus> {
        let tables_exist = schema::table_exists(&self.conn, "books")?
            && schema::table_exists(&self.conn, "users")?;

        let done = if schema::table_exists(&self.conn, "schema_migrations")? {
            self.applied_names()?
        } else {
            HashSet::new()
        };

        let (applied, pending): (Vec<_>, Vec<_>) = MIGRATIONS
            .iter()
            .map(|step| step.name.to_string())
            .partition(|name| done.contains(name.as_str()));

        let (book_count, user_count) = if tables_exist {
            (self.count_rows("books")?, self.count_rows("users")?)
        } else {
            (0, 0)
        };

        Ok(MigrationStatus {
            tables_exist,
            applied,
            pending,
            book_count,
            user_count,
        })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migration and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn applied_names(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM schema_migrations")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(names)
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        schema::validate_identifier(table)?;
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Snapshot of the schema state, returned by [`Migration::status`].
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Whether both `books` and `users` exist.
    pub tables_exist: bool,
    /// Names of migrations already recorded as applied.
    pub applied: Vec<String>,
    /// Names of migrations not yet applied.
    pub pending: Vec<String>,
    /// Number of stored books.
    pub book_count: usize,
    /// Number of registered users.
    pub user_count: usize,
}
