//! Catalog type definitions.
//!
//! This module defines the data model shared by the storage backend, the
//! export renderers and the command-line front end. The types are designed
//! for serialization with [`serde`] and map one-to-one onto the `books` and
//! `users` relations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Earliest publication year accepted by [`YearPolicy::form`].
pub const FORM_MIN_YEAR: i32 = 1800;

/// Latest publication year accepted by [`YearPolicy::form`].
pub const FORM_MAX_YEAR: i32 = 2100;

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;

/// Store-assigned identifier of a [`Book`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub i64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of a [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fields supplied by a caller to create a [`Book`].
///
/// Rating and review are independent of `read_status`: nothing forces them
/// to be absent for unread books.
///
/// # Examples
///
/// ```
/// use bookshelf_core::BookDraft;
///
/// let draft = BookDraft::new("Emma", "Austen", 1815, "Classic")
///     .read(true)
///     .with_rating(4)
///     .with_review("Sharp and funny");
/// assert!(draft.read_status);
/// assert_eq!(draft.review.as_deref(), Some("Sharp and funny"));
/// assert!(draft.cover_image.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Publication year.
    pub year: i32,
    /// Free-form genre label.
    pub genre: String,
    /// Whether the book has been read.
    pub read_status: bool,
    /// Rating from 1 to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Free-text review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    /// Encoded cover image bytes, stored opaquely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<Vec<u8>>,
}

impl BookDraft {
    /// Creates an unread draft with no rating, review or cover.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
            genre: genre.into(),
            read_status: false,
            rating: None,
            review: None,
            cover_image: None,
        }
    }

    /// Sets the read status.
    pub fn read(mut self, read_status: bool) -> Self {
        self.read_status = read_status;
        self
    }

    /// Sets the rating.
    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Sets the review text.
    pub fn with_review(mut self, review: impl Into<String>) -> Self {
        self.review = Some(review.into());
        self
    }

    /// Attaches cover image bytes.
    pub fn with_cover(mut self, bytes: Vec<u8>) -> Self {
        self.cover_image = Some(bytes);
        self
    }
}

/// A stored catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Surrogate key, immutable once assigned.
    pub id: BookId,
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Publication year.
    pub year: i32,
    /// Free-form genre label.
    pub genre: String,
    /// Whether the book has been read.
    pub read_status: bool,
    /// Rating from 1 to 5.
    pub rating: Option<u8>,
    /// Free-text review.
    pub review: Option<String>,
    /// Encoded cover image bytes.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cover_image: Option<Vec<u8>>,
    /// Owning user; `None` in single-user catalogs.
    pub owner: Option<UserId>,
}

impl Book {
    /// Human-readable read status label.
    pub fn status_label(&self) -> &'static str {
        if self.read_status { "Read" } else { "Unread" }
    }
}

/// An account in the multi-user catalog.
///
/// The password digest never leaves the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
}

/// Field a catalog search matches against.
///
/// # Examples
///
/// ```
/// use bookshelf_core::SearchField;
///
/// assert_eq!("Title".parse::<SearchField>().unwrap(), SearchField::Title);
/// assert_eq!(" author ".parse::<SearchField>().unwrap(), SearchField::Author);
/// assert!("genre".parse::<SearchField>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// Match against `title`.
    Title,
    /// Match against `author`.
    Author,
}

impl SearchField {
    /// Column name backing this field.
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => f.write_str("Title"),
            Self::Author => f.write_str("Author"),
        }
    }
}

impl FromStr for SearchField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            other => Err(ValidationError::UnknownSearchField(other.to_string())),
        }
    }
}

/// Catalog totals.
///
/// # Examples
///
/// ```
/// use bookshelf_core::CatalogStats;
///
/// assert_eq!(CatalogStats::default().percent_read(), 0.0);
///
/// let stats = CatalogStats { total: 3, read: 1 };
/// assert_eq!(stats.percent_read_rounded(), 33.3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Number of books.
    pub total: u64,
    /// Number of books marked read.
    pub read: u64,
}

impl CatalogStats {
    /// Percentage of books marked read, unrounded. `0.0` for an empty catalog.
    pub fn percent_read(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.read as f64 / self.total as f64
    }

    /// [`percent_read`](Self::percent_read) rounded to one decimal place.
    pub fn percent_read_rounded(&self) -> f64 {
        (self.percent_read() * 10.0).round() / 10.0
    }
}

/// Which publication years a catalog accepts.
///
/// Serialized as `unrestricted` or `{ bounded: { min, max } }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearPolicy {
    /// Any year is accepted (console variant).
    #[default]
    Unrestricted,
    /// Years must fall within `[min, max]`.
    Bounded {
        /// Inclusive lower bound.
        min: i32,
        /// Inclusive upper bound.
        max: i32,
    },
}

impl YearPolicy {
    /// The `[1800, 2100]` range enforced by the form-based front end.
    pub fn form() -> Self {
        Self::Bounded {
            min: FORM_MIN_YEAR,
            max: FORM_MAX_YEAR,
        }
    }

    /// Returns `true` if `year` is acceptable under this policy.
    pub fn allows(self, year: i32) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Bounded { min, max } => (min..=max).contains(&year),
        }
    }
}

/// Explicit login state handed to every scoped operation.
///
/// # Examples
///
/// ```
/// use bookshelf_core::{Session, UserId};
///
/// let mut session = Session::anonymous();
/// assert!(!session.is_authenticated());
///
/// session.login(UserId(7));
/// assert_eq!(session.user_id(), Some(UserId(7)));
///
/// session.logout();
/// assert_eq!(session.user_id(), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<UserId>,
}

impl Session {
    /// A session with nobody logged in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session already logged in as `user_id`.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Records `user_id` as the current user.
    pub fn login(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
    }

    /// Clears the current user.
    pub fn logout(&mut self) {
        self.user_id = None;
    }

    /// The current user, if any. Doubles as the owner scope for catalog calls.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns `true` when a user is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}
