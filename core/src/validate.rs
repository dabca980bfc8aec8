//! Input validation.
//!
//! Checks the invariants that must hold before a draft or a query reaches
//! the store: required text fields are non-empty, years respect the
//! catalog's [`YearPolicy`], and ratings fall within `1..=5`.
//!
//! # Examples
//!
//! ```
//! use bookshelf_core::*;
//!
//! let draft = BookDraft::new("Dune", "Herbert", 1965, "Sci-Fi");
//! assert!(validate_draft(&draft, YearPolicy::form()).is_ok());
//!
//! // Blank genre
//! let bad = BookDraft::new("Dune", "Herbert", 1965, "   ");
//! assert_eq!(
//!     validate_draft(&bad, YearPolicy::form()),
//!     Err(ValidationError::EmptyField("genre")),
//! );
//! ```

use thiserror::Error;

use crate::{BookDraft, MAX_RATING, MIN_RATING, YearPolicy};

/// Rejected input.
///
/// Recoverable by the caller: the front end re-prompts or shows the message
/// inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty or whitespace-only.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    /// Publication year falls outside the catalog's accepted range.
    #[error("year {year} is outside the accepted range {min}..={max}")]
    YearOutOfRange {
        /// Rejected year.
        year: i32,
        /// Inclusive lower bound.
        min: i32,
        /// Inclusive upper bound.
        max: i32,
    },
    /// Rating is not between 1 and 5.
    #[error("rating {0} is outside the accepted range 1..=5")]
    RatingOutOfRange(u8),
    /// Search field is neither title nor author.
    #[error("unknown search field '{0}': expected title or author")]
    UnknownSearchField(String),
}

/// Fails with [`ValidationError::EmptyField`] when `value` is blank.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// Validates a draft against the catalog's year policy.
///
/// Stops at the first problem, checking title, author and genre first.
pub fn validate_draft(draft: &BookDraft, policy: YearPolicy) -> Result<(), ValidationError> {
    require_non_empty("title", &draft.title)?;
    require_non_empty("author", &draft.author)?;
    require_non_empty("genre", &draft.genre)?;

    if let YearPolicy::Bounded { min, max } = policy {
        if !policy.allows(draft.year) {
            return Err(ValidationError::YearOutOfRange {
                year: draft.year,
                min,
                max,
            });
        }
    }

    if let Some(rating) = draft.rating {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ValidationError::RatingOutOfRange(rating));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> BookDraft {
        BookDraft::new("Dune", "Herbert", 1965, "Sci-Fi")
    }

    #[test]
    fn test_valid_draft() {
        assert!(validate_draft(&draft(), YearPolicy::Unrestricted).is_ok());
        assert!(validate_draft(&draft(), YearPolicy::form()).is_ok());
    }

    #[test]
    fn test_empty_fields_reported_in_order() {
        let mut d = draft();
        d.title = String::new();
        d.author = String::new();
        assert_eq!(
            validate_draft(&d, YearPolicy::Unrestricted),
            Err(ValidationError::EmptyField("title"))
        );

        let mut d = draft();
        d.author = " \t".into();
        assert_eq!(
            validate_draft(&d, YearPolicy::Unrestricted),
            Err(ValidationError::EmptyField("author"))
        );
    }

    #[test]
    fn test_year_only_checked_when_bounded() {
        let mut d = draft();
        d.year = 1200;
        assert!(validate_draft(&d, YearPolicy::Unrestricted).is_ok());
        assert_eq!(
            validate_draft(&d, YearPolicy::form()),
            Err(ValidationError::YearOutOfRange {
                year: 1200,
                min: 1800,
                max: 2100
            })
        );
    }

    #[test]
    fn test_rating_range() {
        assert!(validate_draft(&draft().with_rating(1), YearPolicy::Unrestricted).is_ok());
        assert!(validate_draft(&draft().with_rating(5), YearPolicy::Unrestricted).is_ok());
        assert_eq!(
            validate_draft(&draft().with_rating(0), YearPolicy::Unrestricted),
            Err(ValidationError::RatingOutOfRange(0))
        );
        assert_eq!(
            validate_draft(&draft().with_rating(6), YearPolicy::Unrestricted),
            Err(ValidationError::RatingOutOfRange(6))
        );
    }

    #[test]
    fn test_rating_allowed_on_unread_book() {
        let d = draft().read(false).with_rating(3).with_review("Skimmed it");
        assert!(validate_draft(&d, YearPolicy::Unrestricted).is_ok());
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("term", "x").is_ok());
        assert_eq!(
            require_non_empty("term", "  "),
            Err(ValidationError::EmptyField("term"))
        );
    }
}
