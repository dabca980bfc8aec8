//! Opening a ready-to-use catalog database.

use std::path::Path;

use bookshelf_core::YearPolicy;
use rusqlite::Connection;
use tracing::info;

use crate::catalog::Catalog;
use crate::credentials::Credentials;
use crate::error::Result;
use crate::migration::Migration;

/// A connection whose schema has been brought up to date.
///
/// Opening runs [`Migration::up`]; a failure there is fatal and surfaces as
/// the error from [`Store::open`].
pub struct Store {
    conn: Connection,
    year_policy: YearPolicy,
}

impl Store {
    /// Opens (creating if needed) the database at `path` and migrates it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let store = Self::from_connection(Connection::open(path)?)?;
        info!(path = %path.display(), "opened catalog database");
        Ok(store)
    }

    /// Opens a private in-memory database and migrates it.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Migrates an existing connection.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        let mut migration = Migration::new(conn)?;
        migration.up()?;
        Ok(Self {
            conn: migration.into_connection(),
            year_policy: YearPolicy::Unrestricted,
        })
    }

    /// Sets the year policy handed to every [`Catalog`] from this store.
    pub fn with_year_policy(mut self, year_policy: YearPolicy) -> Self {
        self.year_policy = year_policy;
        self
    }

    /// Book repository over this store.
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(&self.conn).with_year_policy(self.year_policy)
    }

    /// Credential service over this store.
    pub fn credentials(&self) -> Credentials<'_> {
        Credentials::new(&self.conn)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the store and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}
