//! Error types.
//!
//! Recognition itself never fails: a rule that cannot be compiled is skipped and
//! a candidate the phone library cannot parse is dropped. The only fallible
//! surfaces are loading rule data and talking to the phone library.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load or resolve rule data from disk.
#[derive(Debug, Error)]
pub enum RuleDataError {
    #[error("failed to read rule data at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed rule data in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no datetime rule data for locale '{locale}' and no usable default locale")]
    MissingLocale { locale: String },
    #[error("rule data directory {0} does not exist")]
    MissingDirectory(PathBuf),
}

/// A single rule pattern that failed to compile.
#[derive(Debug, Error)]
#[error("rule '{id}' has an invalid pattern: {source}")]
pub struct PatternError {
    pub id: String,
    #[source]
    pub source: Box<fancy_regex::Error>,
}

/// Errors reported by a [`crate::PhoneNumberLibrary`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneLibraryError {
    #[error("not a number: {0}")]
    NotANumber(String),
    #[error("unknown region code '{0}'")]
    UnknownRegion(String),
    #[error("number is too short")]
    TooShort,
    #[error("number is too long")]
    TooLong,
}
