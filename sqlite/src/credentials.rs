//! Password digests and user accounts.
//!
//! [`Credentials`] registers users and maps a username/password pair back
//! to a [`UserId`]. Digests come from a [`PasswordHasher`]; the default
//! [`Sha256Hasher`] produces an unsalted lowercase-hex SHA-256 digest, which
//! keeps existing account rows verifiable. A salted key-derivation function
//! can be dropped in through [`Credentials::with_hasher`] without touching
//! callers.
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_sqlite::{Credentials, Migration};
//! use rusqlite::Connection;
//!
//! let mut migration = Migration::new(Connection::open("library.db").unwrap()).unwrap();
//! migration.up().unwrap();
//! let conn = migration.into_connection();
//!
//! let credentials = Credentials::new(&conn);
//! let id = credentials.register("alice", "pw1").unwrap();
//! assert_eq!(credentials.authenticate("alice", "pw1").unwrap(), Some(id));
//! assert_eq!(credentials.authenticate("alice", "nope").unwrap(), None);
//! ```

use bookshelf_core::{User, UserId, require_non_empty};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// One-way password digest.
pub trait PasswordHasher {
    /// Derives the digest stored for `password`.
    fn hash(&self, password: &str) -> String;

    /// Returns `true` iff `password` produces `digest`.
    fn verify(&self, password: &str, digest: &str) -> bool {
        self.hash(password) == digest
    }
}

/// Unsalted SHA-256, hex encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, password: &str) -> String {
        format!("{:x}", Sha256::digest(password.as_bytes()))
    }
}

/// Hashes `password` with the default [`Sha256Hasher`].
///
/// # Examples
///
/// ```
/// use bookshelf_sqlite::hash_password;
///
/// assert_eq!(
///     hash_password("abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
/// );
/// ```
pub fn hash_password(password: &str) -> String {
    Sha256Hasher.hash(password)
}

/// Checks `password` against a digest from [`hash_password`].
pub fn verify_password(password: &str, digest: &str) -> bool {
    Sha256Hasher.verify(password, digest)
}

/// Account registration and login over the `users` table.
pub struct Credentials<'a, H = Sha256Hasher> {
    conn: &'a Connection,
    hasher: H,
}

impl<'a> Credentials<'a> {
    /// Creates a credential service using [`Sha256Hasher`].
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            hasher: Sha256Hasher,
        }
    }
}

impl<'a, H: PasswordHasher> Credentials<'a, H> {
    /// Creates a credential service with a custom hasher.
    pub fn with_hasher(conn: &'a Connection, hasher: H) -> Self {
        Self { conn, hasher }
    }

    /// Creates a user and returns its id.
    ///
    /// The existence check and the insert run in one transaction; the
    /// `UNIQUE` constraint on `username` backs it up.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an empty username or password
    /// and [`StoreError::DuplicateUsername`] if the name is taken.
    pub fn register(&self, username: &str, password: &str) -> Result<UserId> {
        require_non_empty("username", username)?;
        require_non_empty("password", password)?;

        let tx = self.conn.unchecked_transaction()?;

        let exists: bool = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            params![username],
            |row| Ok(row.get::<_, i64>(0)? > 0),
        )?;
        if exists {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }

        tx.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, self.hasher.hash(password)],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref err, _)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::DuplicateUsername(username.to_string())
            }
            other => StoreError::Database(other),
        })?;
        let id = UserId(tx.last_insert_rowid());
        tx.commit()?;

        info!(user_id = id.0, username, "registered user");
        Ok(id)
    }

    /// Returns the user's id iff the username exists and the password
    /// verifies.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserId>> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE username = ?1",
                params![username],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let user = row
            .filter(|(_, digest)| self.hasher.verify(password, digest))
            .map(|(id, _)| UserId(id));
        debug!(username, success = user.is_some(), "authentication attempt");
        Ok(user)
    }

    /// Loads a user by id.
    pub fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username FROM users WHERE id = ?1",
                params![id.0],
                |row| {
                    Ok(User {
                        id: UserId(row.get(0)?),
                        username: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}
