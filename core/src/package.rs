use serde::{Deserialize, Serialize};

use crate::{Book, UserId};

/// Version of the export bundle layout.
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Serializable bundle of books produced by an export.
///
/// Groups a user's (or the whole catalog's) books with version and
/// timestamp metadata, making it suitable for writing to a single JSON or
/// YAML file.
///
/// # Examples
///
/// ```
/// use bookshelf_core::*;
///
/// let export = CatalogExport::new("2024-01-15T10:30:00Z", Some(UserId(1)));
/// assert_eq!(export.book_count(), 0);
/// assert_eq!(export.format_version, EXPORT_FORMAT_VERSION);
/// assert_eq!(export.owner, Some(UserId(1)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogExport {
    /// Export layout version.
    pub format_version: String,
    /// ISO-8601 timestamp of the export.
    pub exported_at: String,
    /// User whose books were exported; `None` for an unscoped export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserId>,
    /// Exported books.
    pub books: Vec<Book>,
}

impl CatalogExport {
    /// Creates an empty export with the current format version.
    pub fn new(exported_at: impl Into<String>, owner: Option<UserId>) -> Self {
        Self {
            format_version: EXPORT_FORMAT_VERSION.to_string(),
            exported_at: exported_at.into(),
            owner,
            books: Vec::new(),
        }
    }

    /// Creates an export holding `books`.
    pub fn with_books(
        exported_at: impl Into<String>,
        owner: Option<UserId>,
        books: Vec<Book>,
    ) -> Self {
        let mut export = Self::new(exported_at, owner);
        export.books = books;
        export
    }

    /// Returns the number of books in this export.
    pub fn book_count(&self) -> usize {
        self.books.len()
    }
}
