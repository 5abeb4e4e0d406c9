//! Error types for fold-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FoldError {
    /// A civil value was passed where an absolute instant was required, or
    /// the other way around.
    #[error("Invalid argument kind for `{argument}`: expected {expected}, found {found}")]
    InvalidArgumentKind {
        argument: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("No adjustment rule applies to year {year}")]
    NoApplicableRule { year: i32 },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Unknown modification assumption: {0}")]
    UnknownAssumption(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid date-time: {0}")]
    InvalidStamp(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

pub type Result<T> = std::result::Result<T, FoldError>;
