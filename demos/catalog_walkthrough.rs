//! Catalog lifecycle walkthrough.
//!
//! Migrates a fresh database, registers two readers, fills their shelves,
//! searches, prints statistics, exports one shelf as CSV and finally drops
//! the tables again.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p bookshelf-demos --example catalog_walkthrough
//! ```

use bookshelf_config::{ExportFormat, render_books};
use bookshelf_core::{BookDraft, SearchField, Session};
use bookshelf_sqlite::{Migration, Store};
use rusqlite::Connection;

fn main() {
    // === Step 1: Migrate a fresh in-memory database ===
    println!("=== Migration ===");
    let conn = Connection::open_in_memory().unwrap();
    let mut migration = Migration::new(conn).unwrap();

    let status = migration.status().unwrap();
    println!("Before up(): {} pending", status.pending.len());
    for name in migration.up().unwrap() {
        println!("  applied {name}");
    }

    // === Step 2: Accounts ===
    println!("\n=== Accounts ===");
    let store = Store::from_connection(migration.into_connection()).unwrap();
    let credentials = store.credentials();
    let alice = credentials.register("alice", "pw1").unwrap();
    let bob = credentials.register("bob", "pw2").unwrap();
    println!("Registered alice={alice} bob={bob}");

    match credentials.register("alice", "again") {
        Ok(_) => println!("Unexpected: duplicate accepted"),
        Err(e) => println!("Duplicate rejected: {e}"),
    }

    let mut session = Session::anonymous();
    if let Some(id) = credentials.authenticate("alice", "pw1").unwrap() {
        session.login(id);
    }
    println!("Logged in as user {:?}", session.user_id());

    // === Step 3: Fill the shelves ===
    println!("\n=== Adding books ===");
    let catalog = store.catalog();
    let shelf = [
        BookDraft::new("Dune", "Frank Herbert", 1965, "Sci-Fi")
            .read(true)
            .with_rating(5)
            .with_review("Spice must flow"),
        BookDraft::new("Emma", "Jane Austen", 1815, "Classic"),
        BookDraft::new("Dune Messiah", "Frank Herbert", 1969, "Sci-Fi").read(true),
    ];
    for draft in &shelf {
        let id = catalog.add(draft, session.user_id()).unwrap();
        println!("  #{id} {}", draft.title);
    }
    catalog
        .add(&BookDraft::new("Hamlet", "Shakespeare", 1603, "Play"), Some(bob))
        .unwrap();

    // === Step 4: Search and statistics ===
    println!("\n=== Search ===");
    for book in catalog
        .search(SearchField::Author, "herbert", session.user_id())
        .unwrap()
    {
        println!("  {} ({}) - {}", book.title, book.year, book.status_label());
    }

    let stats = catalog.statistics(session.user_id()).unwrap();
    println!(
        "\nalice: {} books, {:.1}% read",
        stats.total,
        stats.percent_read_rounded()
    );
    let stats = catalog.statistics(Some(bob)).unwrap();
    println!("bob: {} books, {:.1}% read", stats.total, stats.percent_read_rounded());

    // === Step 5: Export ===
    println!("\n=== CSV export (alice) ===");
    let books = catalog.list_all(session.user_id()).unwrap();
    print!("{}", render_books(&books, ExportFormat::Csv).unwrap());

    // === Step 6: Remove and clean up ===
    let removed = catalog.remove_by_title("Emma", session.user_id()).unwrap();
    println!("\nRemoved {removed} book(s) titled 'Emma'");
    session.logout();

    let mut migration = Migration::new(store.into_connection()).unwrap();
    migration.down().unwrap();
    println!(
        "Tables exist after down(): {}",
        migration.status().unwrap().tables_exist
    );
    println!("\nDone!");
}
