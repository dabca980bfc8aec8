//! Configuration loading and export rendering for the book catalog.
//!
//! This crate provides the pieces of the command-line front end that are
//! not tied to the database: the YAML [`LibraryConfig`] file and the
//! CSV/JSON/YAML export renderers.
//!
//! # Quick start
//!
//! ```no_run
//! use bookshelf_config::{ExportFormat, LibraryConfig, render_export};
//! use bookshelf_core::CatalogExport;
//!
//! let config = LibraryConfig::load_or_default("bookshelf.yaml").unwrap();
//! println!("catalog lives in {}", config.database.display());
//!
//! let export = CatalogExport::new("2024-01-01T00:00:00Z", None);
//! let json = render_export(&export, ExportFormat::Json).unwrap();
//! assert!(json.contains("\"book_count\": 0"));
//! ```

mod config;
mod error;
mod export;

pub use config::{DEFAULT_DATABASE_FILE, DEFAULT_LOG_FILTER, LibraryConfig};
pub use error::{ConfigError, Result};
pub use export::{CSV_COLUMNS, ExportFormat, render_books, render_export};
