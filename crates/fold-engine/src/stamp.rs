//! Tagged date-time values for boundaries where the kind is only known at runtime.
//!
//! Inside the engine civil times are `NaiveDateTime` and absolute instants are
//! `DateTime<Utc>`, so the compiler keeps them apart. Text coming from a CLI
//! argument or a JSON document does not carry that guarantee; a [`Stamp`]
//! records which kind it parsed as so the checked entry points can reject the
//! wrong one with [`FoldError::InvalidArgumentKind`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{FoldError, Result};

const CIVIL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A date-time value tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    /// Wall-clock time with no offset attached.
    Civil(NaiveDateTime),
    /// A point on the UTC timeline.
    Absolute(DateTime<Utc>),
}

impl Stamp {
    pub fn kind(&self) -> &'static str {
        match self {
            Stamp::Civil(_) => "civil time",
            Stamp::Absolute(_) => "absolute instant",
        }
    }

    /// Returns the civil value, or `InvalidArgumentKind` naming `argument`.
    pub fn civil(self, argument: &'static str) -> Result<NaiveDateTime> {
        match self {
            Stamp::Civil(civil) => Ok(civil),
            other => Err(FoldError::InvalidArgumentKind {
                argument,
                expected: "civil time",
                found: other.kind(),
            }),
        }
    }

    /// Returns the absolute value, or `InvalidArgumentKind` naming `argument`.
    pub fn absolute(self, argument: &'static str) -> Result<DateTime<Utc>> {
        match self {
            Stamp::Absolute(instant) => Ok(instant),
            other => Err(FoldError::InvalidArgumentKind {
                argument,
                expected: "absolute instant",
                found: other.kind(),
            }),
        }
    }
}

/// Parses RFC 3339 text with `Z` or a numeric offset as [`Stamp::Absolute`],
/// and offset-less `YYYY-MM-DDTHH:MM[:SS[.f]]` as [`Stamp::Civil`].
impl FromStr for Stamp {
    type Err = FoldError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Stamp::Absolute(dt.with_timezone(&Utc)));
        }
        CIVIL_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(Stamp::Civil)
            .ok_or_else(|| FoldError::InvalidStamp(s.to_string()))
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stamp::Civil(civil) => write!(f, "{}", civil.format("%Y-%m-%dT%H:%M:%S")),
            Stamp::Absolute(instant) => write!(f, "{}", instant.format("%Y-%m-%dT%H:%M:%SZ")),
        }
    }
}

impl From<NaiveDateTime> for Stamp {
    fn from(civil: NaiveDateTime) -> Self {
        Stamp::Civil(civil)
    }
}

impl From<DateTime<Utc>> for Stamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Stamp::Absolute(instant)
    }
}
