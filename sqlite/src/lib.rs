//! SQLite storage for the book catalog.
//!
//! This crate owns everything that touches the database file: the schema
//! and its migrations, password digests and accounts, and the catalog
//! repository itself.
//!
//! # Architecture
//!
//! - **`schema`** — table DDL and the ordered list of named migrations
//! - **`migration`** — lifecycle operations (up/down/status/ensure-column)
//! - **`convert`** — `Book` ↔ row mapping and `LIKE` pattern escaping
//! - **`catalog`** — add, remove-by-title, search, list, statistics
//! - **`credentials`** — register/authenticate behind a [`PasswordHasher`]
//! - **`store`** — opens a database and migrates it in one step
//!
//! # Quick start
//!
//! ```
//! use bookshelf_core::{BookDraft, SearchField};
//! use bookshelf_sqlite::Store;
//!
//! let store = Store::open_in_memory().unwrap();
//! let alice = store.credentials().register("alice", "pw1").unwrap();
//!
//! let catalog = store.catalog();
//! let draft = BookDraft::new("Dune", "Herbert", 1965, "Sci-Fi")
//!     .read(true)
//!     .with_rating(5);
//! catalog.add(&draft, Some(alice)).unwrap();
//!
//! let books = catalog.list_all(Some(alice)).unwrap();
//! assert_eq!(books.len(), 1);
//! assert_eq!(books[0].rating, Some(5));
//!
//! let hits = catalog.search(SearchField::Title, "dune", Some(alice)).unwrap();
//! assert_eq!(hits.len(), 1);
//!
//! assert_eq!(catalog.remove_by_title("Dune", Some(alice)).unwrap(), 1);
//! assert!(catalog.list_all(Some(alice)).unwrap().is_empty());
//! ```

mod catalog;
mod convert;
mod credentials;
mod error;
mod migration;
mod schema;
mod store;

pub use catalog::Catalog;
pub use credentials::{Credentials, PasswordHasher, Sha256Hasher, hash_password, verify_password};
pub use error::{Result, StoreError};
pub use migration::{Migration, MigrationStatus};
pub use store::Store;
