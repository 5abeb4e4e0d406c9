use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use super::{RuleSource, SourceKind};
use crate::rule::AdjustmentRule;

/// Identity source: civil values already are UTC, nothing is ever ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passthrough {
    id: String,
}

impl Passthrough {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Default for Passthrough {
    fn default() -> Self {
        Self::new("UTC")
    }
}

impl RuleSource for Passthrough {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Passthrough
    }

    fn defaults_to_daylight(&self) -> bool {
        false
    }

    fn active_rule(&self, _year: i32) -> Option<&AdjustmentRule> {
        None
    }

    fn is_ambiguous(&self, _civil: NaiveDateTime) -> bool {
        false
    }

    fn is_invalid(&self, _civil: NaiveDateTime) -> bool {
        false
    }

    fn candidate_offsets(&self, _civil: NaiveDateTime) -> Vec<FixedOffset> {
        Vec::new()
    }

    fn to_absolute(&self, civil: NaiveDateTime) -> DateTime<Utc> {
        civil.and_utc()
    }

    fn to_civil(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.naive_utc()
    }

    fn is_daylight_saving_time(&self, _civil: NaiveDateTime) -> bool {
        false
    }
}
