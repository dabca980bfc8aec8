//! Catalog export rendering.
//!
//! Turns books into CSV, JSON or YAML text. Rows use the `books` column
//! names verbatim; cover images are base64 encoded so every format stays
//! plain text.
//!
//! # Examples
//!
//! ```
//! use bookshelf_config::{ExportFormat, render_books};
//! use bookshelf_core::{Book, BookId};
//!
//! let book = Book {
//!     id: BookId(1),
//!     title: "Dune".into(),
//!     author: "Herbert".into(),
//!     year: 1965,
//!     genre: "Sci-Fi".into(),
//!     read_status: true,
//!     rating: Some(5),
//!     review: None,
//!     cover_image: None,
//!     owner: None,
//! };
//!
//! let csv = render_books(&[book], ExportFormat::Csv).unwrap();
//! let mut lines = csv.lines();
//! assert_eq!(
//!     lines.next(),
//!     Some("id,title,author,year,genre,read_status,rating,review,cover_image,owner_id"),
//! );
//! assert_eq!(lines.next(), Some("1,Dune,Herbert,1965,Sci-Fi,true,5,,,"));
//! ```

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bookshelf_core::{Book, CatalogExport};
use serde::Serialize;

use crate::error::{ConfigError, Result};

/// Header row of a CSV export, matching the `books` table.
pub const CSV_COLUMNS: [&str; 10] = [
    "id",
    "title",
    "author",
    "year",
    "genre",
    "read_status",
    "rating",
    "review",
    "cover_image",
    "owner_id",
];

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

impl ExportFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown export format '{other}': expected csv, json or yaml")),
        }
    }
}

/// One exported `books` row.
#[derive(Debug, Serialize)]
struct BookRecord<'a> {
    id: i64,
    title: &'a str,
    author: &'a str,
    year: i32,
    genre: &'a str,
    read_status: bool,
    rating: Option<u8>,
    review: Option<&'a str>,
    cover_image: Option<String>,
    owner_id: Option<i64>,
}

impl<'a> From<&'a Book> for BookRecord<'a> {
    fn from(book: &'a Book) -> Self {
        Self {
            id: book.id.0,
            title: &book.title,
            author: &book.author,
            year: book.year,
            genre: &book.genre,
            read_status: book.read_status,
            rating: book.rating,
            review: book.review.as_deref(),
            cover_image: book.cover_image.as_ref().map(|bytes| STANDARD.encode(bytes)),
            owner_id: book.owner.map(|o| o.0),
        }
    }
}

/// JSON/YAML export document: metadata plus rows.
#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    format_version: &'a str,
    exported_at: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_id: Option<i64>,
    book_count: usize,
    books: Vec<BookRecord<'a>>,
}

/// Renders bare rows in `format`.
///
/// CSV always carries the header row, even with no books. JSON and YAML
/// produce an array of row records.
pub fn render_books(books: &[Book], format: ExportFormat) -> Result<String> {
    let records: Vec<BookRecord<'_>> = books.iter().map(BookRecord::from).collect();
    match format {
        ExportFormat::Csv => render_csv(&records),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&records)?),
        ExportFormat::Yaml => Ok(serde_yaml::to_string(&records)?),
    }
}

/// Renders a full export.
///
/// CSV has no place for metadata, so it renders the rows only; JSON and
/// YAML wrap them with the export's version, timestamp and owner.
pub fn render_export(export: &CatalogExport, format: ExportFormat) -> Result<String> {
    if format == ExportFormat::Csv {
        return render_books(&export.books, format);
    }

    let document = ExportDocument {
        format_version: &export.format_version,
        exported_at: &export.exported_at,
        owner_id: export.owner.map(|o| o.0),
        book_count: export.book_count(),
        books: export.books.iter().map(BookRecord::from).collect(),
    };
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&document)?),
        _ => Ok(serde_yaml::to_string(&document)?),
    }
}

fn render_csv(records: &[BookRecord<'_>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ConfigError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|_| ConfigError::CsvEncoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::{BookId, UserId};

    fn book(id: i64, title: &str) -> Book {
        Book {
            id: BookId(id),
            title: title.to_string(),
            author: "Author".to_string(),
            year: 2001,
            genre: "Genre".to_string(),
            read_status: false,
            rating: None,
            review: None,
            cover_image: None,
            owner: Some(UserId(3)),
        }
    }

    #[test]
    fn test_csv_header_without_books() {
        let csv = render_books(&[], ExportFormat::Csv).unwrap();
        assert_eq!(csv.trim_end(), CSV_COLUMNS.join(","));
    }

    #[test]
    fn test_csv_quotes_commas() {
        let csv = render_books(&[book(7, "Eats, Shoots & Leaves")], ExportFormat::Csv).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "7,\"Eats, Shoots & Leaves\",Author,2001,Genre,false,,,,3");
    }

    #[test]
    fn test_cover_is_base64() {
        let mut b = book(1, "Covered");
        b.cover_image = Some(vec![0xFF, 0xD8, 0xFF]);
        let json = render_books(&[b], ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["cover_image"], "/9j/");
    }

    #[test]
    fn test_json_rows_use_column_names() {
        let json = render_books(&[book(1, "A"), book(2, "B")], ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        let keys: Vec<_> = rows[0].as_object().unwrap().keys().cloned().collect();
        let mut expected: Vec<_> = CSV_COLUMNS.iter().map(|c| c.to_string()).collect();
        expected.sort();
        let mut keys_sorted = keys;
        keys_sorted.sort();
        assert_eq!(keys_sorted, expected);
        assert_eq!(rows[1]["owner_id"], 3);
    }

    #[test]
    fn test_export_document_metadata() {
        let export = CatalogExport::with_books("2024-05-01T00:00:00Z", Some(UserId(3)), vec![book(1, "A")]);
        let json = render_export(&export, ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["exported_at"], "2024-05-01T00:00:00Z");
        assert_eq!(value["owner_id"], 3);
        assert_eq!(value["book_count"], 1);
        assert_eq!(value["books"][0]["title"], "A");
    }

    #[test]
    fn test_yaml_export() {
        let export = CatalogExport::with_books("now", None, vec![book(1, "A")]);
        let yaml = render_export(&export, ExportFormat::Yaml).unwrap();
        assert!(yaml.contains("format_version:"));
        assert!(yaml.contains("title: A"));
        assert!(yaml.contains("book_count: 1"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("yml".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
