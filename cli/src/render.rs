//! Plain-text formatting of catalog results.

use bookshelf_core::{Book, CatalogStats};

/// Shown when a listing has nothing in it.
pub const EMPTY_LIBRARY: &str = "No books in the library.";

/// Shown when a search has no hits.
pub const NO_MATCHES: &str = "No matching books found.";

/// `"1. Dune by Herbert (1965) - Sci-Fi - Read"`
pub fn book_line(index: usize, book: &Book) -> String {
    format!(
        "{index}. {} by {} ({}) - {} - {}",
        book.title,
        book.author,
        book.year,
        book.genre,
        book.status_label()
    )
}

/// Numbered listing with rating and review lines under each book.
pub fn book_listing(books: &[Book]) -> String {
    let mut out = String::new();
    for (i, book) in books.iter().enumerate() {
        out.push_str(&book_line(i + 1, book));
        out.push('\n');
        if let Some(rating) = book.rating {
            out.push_str(&format!("   Rating: {rating}/5\n"));
        }
        if let Some(review) = book.review.as_deref().filter(|r| !r.is_empty()) {
            out.push_str(&format!("   Review: {review}\n"));
        }
    }
    out
}

/// Total and one-decimal read percentage.
pub fn stats_summary(stats: &CatalogStats) -> String {
    format!(
        "Total books: {}\nPercentage read: {:.1}%\n",
        stats.total,
        stats.percent_read_rounded()
    )
}
