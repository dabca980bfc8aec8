//! Numbered-menu console loop.
//!
//! Reads one choice at a time, runs it to completion and shows the menu
//! again. Bad input re-prompts; a rejected book or search term prints the
//! validation message and returns to the menu. End of input behaves like
//! choosing Exit.

use std::io::{self, BufRead, Write};

use bookshelf_core::{BookDraft, SearchField, Session};
use bookshelf_sqlite::{Store, StoreError};
use tracing::warn;

use crate::render;

const MENU: &str = "\nMenu:
1. Add a Book
2. Remove a Book
3. Search for a Book
4. Display All Books
5. Display Statistics
6. Exit";

/// Runs the menu until the user exits or input ends.
pub fn run<R: BufRead, W: Write>(
    store: &Store,
    session: Session,
    mut input: R,
    mut output: W,
) -> io::Result<()> {
    writeln!(output, "Personal Library Manager")?;
    writeln!(output, "Welcome to your personal library! Manage your book collection with ease.")?;

    let mut console = Console {
        store,
        session,
        input: &mut input,
        output: &mut output,
    };

    loop {
        writeln!(console.output, "{MENU}")?;
        let Some(choice) = console.prompt("Choose an option (1-6): ")? else {
            writeln!(console.output)?;
            return Ok(());
        };

        let finished = match choice.trim() {
            "1" => console.add_book()?,
            "2" => console.remove_book()?,
            "3" => console.search_books()?,
            "4" => console.display_all()?,
            "5" => console.display_statistics()?,
            "6" => {
                writeln!(console.output, "Goodbye!")?;
                return Ok(());
            }
            _ => {
                writeln!(console.output, "Invalid choice. Please select a valid option.")?;
                Step::Continue
            }
        };

        if finished == Step::EndOfInput {
            writeln!(console.output)?;
            return Ok(());
        }
    }
}

/// Whether the loop can keep reading.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    EndOfInput,
}

struct Console<'a, R, W> {
    store: &'a Store,
    session: Session,
    input: &'a mut R,
    output: &'a mut W,
}

/// Unwraps a prompt answer, ending the current action on end of input.
macro_rules! answer {
    ($value:expr) => {
        match $value {
            Some(value) => value,
            None => return Ok(Step::EndOfInput),
        }
    };
}

impl<R: BufRead, W: Write> Console<'_, R, W> {
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Asks until the answer parses as a year.
    fn prompt_year(&mut self) -> io::Result<Option<i32>> {
        loop {
            let Some(raw) = self.prompt("Enter the publication year: ")? else {
                return Ok(None);
            };
            match raw.trim().parse() {
                Ok(year) => return Ok(Some(year)),
                Err(_) => writeln!(self.output, "Please enter a whole number.")?,
            }
        }
    }

    /// Asks until the answer is blank or a rating from 1 to 5.
    fn prompt_rating(&mut self) -> io::Result<Option<Option<u8>>> {
        loop {
            let Some(raw) = self.prompt("Rating 1-5 (leave blank to skip): ")? else {
                return Ok(None);
            };
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(Some(None));
            }
            match raw.parse::<u8>() {
                Ok(rating) if (1..=5).contains(&rating) => return Ok(Some(Some(rating))),
                _ => writeln!(self.output, "Please enter a number from 1 to 5.")?,
            }
        }
    }

    fn report(&mut self, err: &StoreError) -> io::Result<()> {
        if !err.is_validation() {
            warn!(error = %err, "catalog operation failed");
        }
        writeln!(self.output, "Error: {err}")
    }

    fn add_book(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\nAdd a Book")?;
        let title = answer!(self.prompt("Enter the book title: ")?);
        let author = answer!(self.prompt("Enter the author's name: ")?);
        let year = answer!(self.prompt_year()?);
        let genre = answer!(self.prompt("Enter the genre: ")?);
        let read = answer!(self.prompt("Have you read this book? (Yes/No): ")?);
        let read = read.trim().eq_ignore_ascii_case("yes");

        let mut draft = BookDraft::new(title, author, year, genre).read(read);
        if read {
            if let Some(rating) = answer!(self.prompt_rating()?) {
                draft = draft.with_rating(rating);
            }
            let review = answer!(self.prompt("Review (leave blank to skip): ")?);
            if !review.trim().is_empty() {
                draft = draft.with_review(review);
            }
        }

        match self.store.catalog().add(&draft, self.session.user_id()) {
            Ok(_) => writeln!(self.output, "Book added successfully!")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Step::Continue)
    }

    fn remove_book(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\nRemove a Book")?;
        let title = answer!(self.prompt("Enter the title of the book to remove: ")?);

        match self
            .store
            .catalog()
            .remove_by_title(&title, self.session.user_id())
        {
            Ok(0) => writeln!(self.output, "No book titled '{title}' was found.")?,
            Ok(n) => writeln!(self.output, "Removed {n} book(s) titled '{title}'.")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Step::Continue)
    }

    fn search_books(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\nSearch for a Book")?;
        let field = loop {
            let raw = answer!(self.prompt("Search by (Title/Author): ")?);
            match raw.parse::<SearchField>() {
                Ok(field) => break field,
                Err(err) => writeln!(self.output, "{err}")?,
            }
        };
        let term = answer!(self.prompt(&format!("Enter the {}: ", field.column()))?);

        match self
            .store
            .catalog()
            .search(field, &term, self.session.user_id())
        {
            Ok(books) if books.is_empty() => writeln!(self.output, "{}", render::NO_MATCHES)?,
            Ok(books) => {
                writeln!(self.output, "Matching Books:")?;
                write!(self.output, "{}", render::book_listing(&books))?;
            }
            Err(err) => self.report(&err)?,
        }
        Ok(Step::Continue)
    }

    fn display_all(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\nYour Library")?;
        match self.store.catalog().list_all(self.session.user_id()) {
            Ok(books) if books.is_empty() => writeln!(self.output, "{}", render::EMPTY_LIBRARY)?,
            Ok(books) => write!(self.output, "{}", render::book_listing(&books))?,
            Err(err) => self.report(&err)?,
        }
        Ok(Step::Continue)
    }

    fn display_statistics(&mut self) -> io::Result<Step> {
        writeln!(self.output, "\nLibrary Statistics")?;
        match self.store.catalog().statistics(self.session.user_id()) {
            Ok(stats) => write!(self.output, "{}", render::stats_summary(&stats))?,
            Err(err) => self.report(&err)?,
        }
        Ok(Step::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(store: &Store, session: Session, script: &str) -> String {
        let mut out = Vec::new();
        run(store, session, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_exit_immediately() {
        let store = Store::open_in_memory().unwrap();
        let out = run_script(&store, Session::anonymous(), "6\n");
        assert!(out.contains("1. Add a Book"));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_invalid_choice_reprompts() {
        let store = Store::open_in_memory().unwrap();
        let out = run_script(&store, Session::anonymous(), "9\nabc\n6\n");
        assert_eq!(out.matches("Invalid choice").count(), 2);
        assert_eq!(out.matches("Choose an option").count(), 3);
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let store = Store::open_in_memory().unwrap();
        let out = run_script(&store, Session::anonymous(), "4\n");
        assert!(out.contains(render::EMPTY_LIBRARY));
    }

    #[test]
    fn test_add_list_and_statistics() {
        let store = Store::open_in_memory().unwrap();
        let script = "1\nDune\nHerbert\nnineteen\n1965\nSci-Fi\nyes\n7\n5\nGreat\n4\n5\n6\n";
        let out = run_script(&store, Session::anonymous(), script);

        assert!(out.contains("Please enter a whole number."));
        assert!(out.contains("Please enter a number from 1 to 5."));
        assert!(out.contains("Book added successfully!"));
        assert!(out.contains("1. Dune by Herbert (1965) - Sci-Fi - Read"));
        assert!(out.contains("Rating: 5/5"));
        assert!(out.contains("Review: Great"));
        assert!(out.contains("Percentage read: 100.0%"));

        let books = store.catalog().list_all(None).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].rating, Some(5));
    }

    #[test]
    fn test_unread_book_skips_rating_prompts() {
        let store = Store::open_in_memory().unwrap();
        let out = run_script(&store, Session::anonymous(), "1\nEmma\nAusten\n1815\nClassic\nno\n6\n");
        assert!(!out.contains("Rating 1-5"));
        let books = store.catalog().list_all(None).unwrap();
        assert!(!books[0].read_status);
    }

    #[test]
    fn test_empty_field_reports_validation_error() {
        let store = Store::open_in_memory().unwrap();
        let out = run_script(&store, Session::anonymous(), "1\n\nAusten\n1815\nClassic\nno\n6\n");
        assert!(out.contains("title cannot be empty"));
        assert!(store.catalog().list_all(None).unwrap().is_empty());
    }

    #[test]
    fn test_search_and_remove() {
        let store = Store::open_in_memory().unwrap();
        store
            .catalog()
            .add(&BookDraft::new("Dune", "Herbert", 1965, "Sci-Fi"), None)
            .unwrap();

        let out = run_script(
            &store,
            Session::anonymous(),
            "3\ngenre\nauthor\nHERB\n2\nDune\n2\nDune\n3\ntitle\ndune\n6\n",
        );
        assert!(out.contains("unknown search field 'genre'"));
        assert!(out.contains("Matching Books:"));
        assert!(out.contains("Removed 1 book(s) titled 'Dune'."));
        assert!(out.contains("No book titled 'Dune' was found."));
        assert!(out.contains(render::NO_MATCHES));
    }

    #[test]
    fn test_session_scopes_menu() {
        let store = Store::open_in_memory().unwrap();
        let alice = store.credentials().register("alice", "pw").unwrap();
        let bob = store.credentials().register("bob", "pw").unwrap();
        store
            .catalog()
            .add(&BookDraft::new("Alice Only", "A", 2000, "G"), Some(alice))
            .unwrap();

        let out = run_script(&store, Session::for_user(bob), "4\n6\n");
        assert!(out.contains(render::EMPTY_LIBRARY));

        let out = run_script(&store, Session::for_user(alice), "4\n6\n");
        assert!(out.contains("Alice Only"));
    }
}
