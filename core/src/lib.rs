//! Core catalog types and shared validation primitives.
//!
//! This crate defines the foundational types for modeling a personal book
//! catalog:
//!
//! - [`BookDraft`] — the caller-supplied fields of a new book, before the
//!   store assigns an id.
//! - [`Book`] — a stored catalog entry with its id and optional owner.
//! - [`User`] — an account in the multi-user variant.
//! - [`Session`] — the explicit "who is logged in" value passed to scoped
//!   operations.
//! - [`CatalogStats`] — totals and the read percentage.
//! - [`CatalogExport`] — a versioned bundle of books for export.
//!
//! Validation ([`validate_draft`], [`require_non_empty`]) catches empty
//! required fields, out-of-range years and ratings before anything touches
//! the store.
//!
//! # Example
//!
//! ```
//! use bookshelf_core::*;
//!
//! let draft = BookDraft::new("Dune", "Herbert", 1965, "Sci-Fi")
//!     .read(true)
//!     .with_rating(5);
//!
//! assert!(validate_draft(&draft, YearPolicy::Unrestricted).is_ok());
//! assert_eq!(draft.rating, Some(5));
//!
//! let empty = BookDraft::new("", "Herbert", 1965, "Sci-Fi");
//! assert_eq!(
//!     validate_draft(&empty, YearPolicy::Unrestricted),
//!     Err(ValidationError::EmptyField("title")),
//! );
//! ```

mod package;
mod types;
mod validate;

pub use package::{CatalogExport, EXPORT_FORMAT_VERSION};
pub use types::*;
pub use validate::{ValidationError, require_non_empty, validate_draft};
