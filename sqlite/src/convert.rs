//! Conversion between catalog types and `books` rows.
//!
//! Every query that returns books selects [`BOOK_COLUMNS`] in this exact
//! order so that [`row_to_book`] can read them positionally.

use bookshelf_core::{Book, BookDraft, BookId, UserId};
use rusqlite::{Connection, Row, params};

use crate::error::Result;

/// Column list, in the order [`row_to_book`] expects.
pub(crate) const BOOK_COLUMNS: &str =
    "id, title, author, year, genre, read_status, rating, review, cover_image, owner_id";

/// Escape character used with `LIKE ... ESCAPE`.
pub(crate) const LIKE_ESCAPE: char = '\\';

/// Builds a `Book` from a row selected with [`BOOK_COLUMNS`].
pub(crate) fn row_to_book(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: BookId(row.get(0)?),
        title: row.get(1)?,
        author: row.get(2)?,
        year: row.get(3)?,
        genre: row.get(4)?,
        read_status: row.get(5)?,
        rating: row.get(6)?,
        review: row.get(7)?,
        cover_image: row.get(8)?,
        owner: row.get::<_, Option<i64>>(9)?.map(UserId),
    })
}

/// Inserts a draft into `books` and returns the assigned id.
///
/// Optional fields are written as given; nothing is cleared based on
/// `read_status`.
pub(crate) fn insert_book(
    conn: &Connection,
    draft: &BookDraft,
    owner: Option<UserId>,
) -> Result<BookId> {
    conn.execute(
        "INSERT INTO books (title, author, year, genre, read_status, rating, review, cover_image, owner_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            draft.title,
            draft.author,
            draft.year,
            draft.genre,
            draft.read_status,
            draft.rating,
            draft.review,
            draft.cover_image,
            owner.map(|o| o.0),
        ],
    )?;
    Ok(BookId(conn.last_insert_rowid()))
}

/// Wraps `term` as a `%term%` pattern, escaping `LIKE` wildcards so they
/// match literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
