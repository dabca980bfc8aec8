//! Catalog reads and writes.
//!
//! Provides [`Catalog`], the repository over the `books` table. Every
//! operation takes an optional owner: `Some(user)` restricts the statement
//! to that user's rows, `None` ignores ownership (single-user mode).
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_core::{BookDraft, SearchField};
//! use bookshelf_sqlite::{Catalog, Migration};
//! use rusqlite::Connection;
//!
//! let mut migration = Migration::new(Connection::open("library.db").unwrap()).unwrap();
//! migration.up().unwrap();
//! let conn = migration.into_connection();
//! let catalog = Catalog::new(&conn);
//!
//! let draft = BookDraft::new("Dune", "Frank Herbert", 1965, "Sci-Fi").read(true);
//! catalog.add(&draft, None).unwrap();
//!
//! let hits = catalog.search(SearchField::Author, "herbert", None).unwrap();
//! assert_eq!(hits.len(), 1);
//!
//! let stats = catalog.statistics(None).unwrap();
//! println!("{:.1}% read", stats.percent_read());
//! ```

use bookshelf_core::{
    Book, BookDraft, BookId, CatalogStats, SearchField, UserId, YearPolicy, require_non_empty,
    validate_draft,
};
use rusqlite::{Connection, OptionalExtension, ToSql, params};
use tracing::{debug, info};

use crate::convert::{self, BOOK_COLUMNS};
use crate::error::Result;

/// Repository over the `books` table.
///
/// Borrows a connection whose schema is already up to date (see
/// [`Migration::up`](crate::Migration::up)). Each method executes a single
/// statement, so no explicit transaction is needed.
pub struct Catalog<'a> {
    conn: &'a Connection,
    year_policy: YearPolicy,
}

impl<'a> Catalog<'a> {
    /// Creates a catalog that accepts any publication year.
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            year_policy: YearPolicy::Unrestricted,
        }
    }

    /// Sets the year policy applied by [`add`](Self::add).
    pub fn with_year_policy(mut self, year_policy: YearPolicy) -> Self {
        self.year_policy = year_policy;
        self
    }

    /// The year policy applied by [`add`](Self::add).
    pub fn year_policy(&self) -> YearPolicy {
        self.year_policy
    }

    /// Validates and inserts a new book, returning its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`](crate::StoreError::Validation) if
    /// title, author or genre is empty, the year violates the catalog's
    /// policy, or the rating is outside `1..=5`.
    pub fn add(&self, draft: &BookDraft, owner: Option<UserId>) -> Result<BookId> {
        validate_draft(draft, self.year_policy)?;
        let id = convert::insert_book(self.conn, draft, owner)?;
        info!(book_id = id.0, title = %draft.title, owner = ?owner.map(|o| o.0), "added book");
        Ok(id)
    }

    /// Deletes every book whose title matches `title` exactly
    /// (case-sensitive), returning how many rows were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`](crate::StoreError::Validation) if
    /// `title` is empty.
    pub fn remove_by_title(&self, title: &str, owner: Option<UserId>) -> Result<usize> {
        require_non_empty("title", title)?;

        let owner_id = owner.map(|o| o.0);
        let mut args: Vec<&dyn ToSql> = Vec::with_capacity(2);
        args.push(&title);
        let mut sql = String::from("DELETE FROM books WHERE title = ?1");
        if let Some(id) = &owner_id {
            sql.push_str(" AND owner_id = ?2");
            args.push(id);
        }

        let removed = self.conn.execute(&sql, args.as_slice())?;
        info!(title, removed, owner = ?owner_id, "removed books by title");
        Ok(removed)
    }

    /// Finds books whose `field` contains `term`, ignoring case.
    ///
    /// The term is trimmed; `%` and `_` in it match literally. Case folding
    /// follows SQLite's `LIKE`, which folds ASCII letters only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`](crate::StoreError::Validation) if
    /// `term` is empty.
    pub fn search(&self, field: SearchField, term: &str, owner: Option<UserId>) -> Result<Vec<Book>> {
        require_non_empty("search term", term)?;

        let pattern = convert::like_pattern(term.trim());
        let owner_id = owner.map(|o| o.0);
        let mut args: Vec<&dyn ToSql> = Vec::with_capacity(2);
        args.push(&pattern);
        let mut sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE {} LIKE ?1 ESCAPE '{}'",
            field.column(),
            convert::LIKE_ESCAPE
        );
        if let Some(id) = &owner_id {
            sql.push_str(" AND owner_id = ?2");
            args.push(id);
        }
        sql.push_str(" ORDER BY id");

        let books = self.query_books(&sql, &args)?;
        debug!(%field, term, hits = books.len(), "searched catalog");
        Ok(books)
    }

    /// Returns every book, optionally restricted to one owner.
    pub fn list_all(&self, owner: Option<UserId>) -> Result<Vec<Book>> {
        match owner {
            Some(UserId(id)) => self.query_books(
                &format!("SELECT {BOOK_COLUMNS} FROM books WHERE owner_id = ?1 ORDER BY id"),
                params![id],
            ),
            None => self.query_books(
                &format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"),
                params![],
            ),
        }
    }

    /// Loads one book by id, honoring the owner scope.
    pub fn get(&self, id: BookId, owner: Option<UserId>) -> Result<Option<Book>> {
        let owner_id = owner.map(|o| o.0);
        let mut args: Vec<&dyn ToSql> = Vec::with_capacity(2);
        args.push(&id.0);
        let mut sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1");
        if let Some(owner_id) = &owner_id {
            sql.push_str(" AND owner_id = ?2");
            args.push(owner_id);
        }

        let book = self
            .conn
            .query_row(&sql, args.as_slice(), convert::row_to_book)
            .optional()?;
        Ok(book)
    }

    /// Counts books and read books.
    ///
    /// Use [`CatalogStats::percent_read`] for the percentage; it is `0.0`
    /// for an empty catalog.
    pub fn statistics(&self, owner: Option<UserId>) -> Result<CatalogStats> {
        let base = "SELECT COUNT(*), COALESCE(SUM(CASE WHEN read_status THEN 1 ELSE 0 END), 0) FROM books";
        let read_counts = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(i64, i64)> {
            Ok((row.get(0)?, row.get(1)?))
        };

        let (total, read) = match owner {
            Some(UserId(id)) => self.conn.query_row(
                &format!("{base} WHERE owner_id = ?1"),
                [id],
                read_counts,
            )?,
            None => self.conn.query_row(base, [], read_counts)?,
        };

        Ok(CatalogStats {
            total: total as u64,
            read: read as u64,
        })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        self.conn
    }

    fn query_books(&self, sql: &str, args: &[&dyn ToSql]) -> Result<Vec<Book>> {
        let mut stmt = self.conn.prepare(sql)?;
        let books = stmt
            .query_map(args, convert::row_to_book)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Migration;
    use crate::error::StoreError;
    use bookshelf_core::ValidationError;

    fn setup() -> Connection {
        let mut migration = Migration::new(Connection::open_in_memory().unwrap()).unwrap();
        migration.up().unwrap();
        migration.into_connection()
    }

    fn add_user(conn: &Connection, name: &str) -> UserId {
        conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, 'x')",
            [name],
        )
        .unwrap();
        UserId(conn.last_insert_rowid())
    }

    #[test]
    fn test_add_returns_fresh_ids() {
        let conn = setup();
        let catalog = Catalog::new(&conn);
        let a = catalog.add(&BookDraft::new("A", "X", 2000, "G"), None).unwrap();
        let b = catalog.add(&BookDraft::new("B", "Y", 2001, "G"), None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_add_rejects_empty_genre() {
        let conn = setup();
        let catalog = Catalog::new(&conn);
        let err = catalog
            .add(&BookDraft::new("A", "X", 2000, ""), None)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptyField("genre"))
        ));
        assert!(catalog.list_all(None).unwrap().is_empty());
    }

    #[test]
    fn test_year_policy_applied_on_add() {
        let conn = setup();
        let catalog = Catalog::new(&conn).with_year_policy(YearPolicy::form());
        let err = catalog
            .add(&BookDraft::new("Old", "X", 1500, "G"), None)
            .unwrap_err();
        assert!(err.is_validation());

        let lenient = Catalog::new(&conn);
        assert!(lenient.add(&BookDraft::new("Old", "X", 1500, "G"), None).is_ok());
    }

    #[test]
    fn test_remove_is_case_sensitive_and_exact() {
        let conn = setup();
        let catalog = Catalog::new(&conn);
        catalog.add(&BookDraft::new("Dune", "H", 1965, "S"), None).unwrap();
        catalog.add(&BookDraft::new("Dune Messiah", "H", 1969, "S"), None).unwrap();

        assert_eq!(catalog.remove_by_title("dune", None).unwrap(), 0);
        assert_eq!(catalog.remove_by_title("Dune", None).unwrap(), 1);
        assert_eq!(catalog.list_all(None).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_deletes_all_duplicates() {
        let conn = setup();
        let catalog = Catalog::new(&conn);
        for _ in 0..3 {
            catalog.add(&BookDraft::new("Copy", "A", 2000, "G"), None).unwrap();
        }
        assert_eq!(catalog.remove_by_title("Copy", None).unwrap(), 3);
    }

    #[test]
    fn test_remove_rejects_empty_title() {
        let conn = setup();
        let catalog = Catalog::new(&conn);
        assert!(catalog.remove_by_title("", None).unwrap_err().is_validation());
    }

    #[test]
    fn test_search_rejects_empty_term() {
        let conn = setup();
        let catalog = Catalog::new(&conn);
        assert!(
            catalog
                .search(SearchField::Title, "   ", None)
                .unwrap_err()
                .is_validation()
        );
    }

    #[test]
    fn test_search_wildcards_are_literal() {
        let conn = setup();
        let catalog = Catalog::new(&conn);
        catalog.add(&BookDraft::new("100% Juice", "A", 2000, "G"), None).unwrap();
        catalog.add(&BookDraft::new("1000 Nights", "A", 2000, "G"), None).unwrap();

        let hits = catalog.search(SearchField::Title, "100%", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "100% Juice");

        let hits = catalog.search(SearchField::Title, "_", None).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_owner_scoping() {
        let conn = setup();
        let alice = add_user(&conn, "alice");
        let bob = add_user(&conn, "bob");
        let catalog = Catalog::new(&conn);

        catalog.add(&BookDraft::new("Shared", "A", 2000, "G").read(true), Some(alice)).unwrap();
        catalog.add(&BookDraft::new("Shared", "A", 2000, "G"), Some(bob)).unwrap();

        assert_eq!(catalog.list_all(Some(alice)).unwrap().len(), 1);
        assert_eq!(catalog.list_all(None).unwrap().len(), 2);
        assert_eq!(
            catalog.search(SearchField::Title, "shared", Some(bob)).unwrap().len(),
            1
        );

        assert_eq!(catalog.statistics(Some(alice)).unwrap(), CatalogStats { total: 1, read: 1 });
        assert_eq!(catalog.statistics(Some(bob)).unwrap(), CatalogStats { total: 1, read: 0 });

        assert_eq!(catalog.remove_by_title("Shared", Some(alice)).unwrap(), 1);
        let rest = catalog.list_all(None).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].owner, Some(bob));
    }

    #[test]
    fn test_get_honors_owner() {
        let conn = setup();
        let alice = add_user(&conn, "alice");
        let bob = add_user(&conn, "bob");
        let catalog = Catalog::new(&conn);
        let id = catalog.add(&BookDraft::new("Mine", "A", 2000, "G"), Some(alice)).unwrap();

        assert!(catalog.get(id, Some(alice)).unwrap().is_some());
        assert!(catalog.get(id, Some(bob)).unwrap().is_none());
        assert!(catalog.get(id, None).unwrap().is_some());
        assert!(catalog.get(BookId(9999), None).unwrap().is_none());
    }

    #[test]
    fn test_optional_fields_round_trip() {
        let conn = setup();
        let catalog = Catalog::new(&conn);
        let draft = BookDraft::new("Covered", "A", 2000, "G")
            .with_rating(2)
            .with_review("meh")
            .with_cover(vec![0xFF, 0xD8, 0xFF]);
        let id = catalog.add(&draft, None).unwrap();

        let book = catalog.get(id, None).unwrap().unwrap();
        assert!(!book.read_status);
        assert_eq!(book.rating, Some(2));
        assert_eq!(book.review.as_deref(), Some("meh"));
        assert_eq!(book.cover_image, Some(vec![0xFF, 0xD8, 0xFF]));
        assert_eq!(book.owner, None);
    }
}
