//! Error types for catalog storage operations.
//!
//! Provides a unified error type covering database access, validation,
//! registration conflicts, row conversion and migration failures.

use bookshelf_core::ValidationError;
use thiserror::Error;

/// Errors that can occur during catalog storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Caller input was rejected before reaching the database.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Registration attempted with a username that is already taken.
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// A stored row could not be turned back into a domain value.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Schema migration failure.
    #[error("migration error: {0}")]
    Migration(String),

    /// Table or column name contains characters other than alphanumerics
    /// and underscores.
    #[error("invalid identifier '{0}': must contain only alphanumeric characters and underscores")]
    InvalidIdentifier(String),
}

impl StoreError {
    /// Returns `true` for errors the caller can fix by changing its input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
