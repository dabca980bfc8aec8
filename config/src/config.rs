//! Library configuration file.
//!
//! Defines the YAML-serializable settings that control where the catalog
//! lives, whether it is shared by several accounts, which publication years
//! it accepts, and how chatty logging is. Every key is optional; missing
//! keys take the [`Default`] value.
//!
//! # Example YAML
//!
//! ```yaml
//! database: library.db
//! multi_user: true
//! year_policy:
//!   bounded:
//!     min: 1800
//!     max: 2100
//! log_filter: info
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use bookshelf_core::YearPolicy;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Database file used when none is configured.
pub const DEFAULT_DATABASE_FILE: &str = "library.db";

/// Log filter used when none is configured.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Top-level library configuration.
///
/// # Examples
///
/// ```
/// use bookshelf_config::LibraryConfig;
/// use bookshelf_core::YearPolicy;
///
/// let config = LibraryConfig::default();
/// assert_eq!(config.database.to_str(), Some("library.db"));
/// assert!(!config.multi_user);
/// assert_eq!(config.year_policy, YearPolicy::Unrestricted);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Path of the SQLite database file.
    pub database: PathBuf,
    /// Require a login for catalog commands and scope them to that user.
    pub multi_user: bool,
    /// Accepted publication years for new books.
    pub year_policy: YearPolicy,
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE_FILE),
            multi_user: false,
            year_policy: YearPolicy::Unrestricted,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl LibraryConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ConfigError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::ConfigError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ConfigError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::ConfigError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
