//! Rule sources: the capability interface the resolver queries.
//!
//! Three interchangeable backends implement [`RuleSource`]:
//!
//! - [`Passthrough`]: no daylight time; civil values are taken as UTC.
//! - [`AdjustmentTable`]: rule lookup by validity window, ambiguous civil
//!   times default to the standard-time (second) hour.
//! - [`DaylightChanges`]: rule lookup by year, ambiguous civil times default
//!   to the daylight-time (first) hour.
//!
//! The two rule-table backends agree on which civil times are ambiguous and
//! on the pair of candidate offsets. They disagree on the default hour and on
//! the order in which they list candidates; callers that care must ask
//! [`RuleSource::defaults_to_daylight`] instead of assuming.

mod adjustment;
mod daylight;
mod passthrough;

use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub use adjustment::AdjustmentTable;
pub use daylight::DaylightChanges;
pub use passthrough::Passthrough;

use crate::rule::{AdjustmentRule, DaylightTime};
use crate::zone::ZoneRules;

/// Offset and ambiguity queries for one timezone.
pub trait RuleSource: Send + Sync {
    /// Identifier of the zone this source answers for.
    fn id(&self) -> &str;

    /// Short human-readable label of the backend.
    fn description(&self) -> &'static str {
        self.kind().description()
    }

    fn kind(&self) -> SourceKind;

    /// Whether [`RuleSource::to_absolute`] reads an ambiguous civil time as
    /// daylight time (the earlier instant) rather than standard time.
    fn defaults_to_daylight(&self) -> bool;

    /// The unique rule whose validity window contains a civil date in `year`.
    fn active_rule(&self, year: i32) -> Option<&AdjustmentRule>;

    /// The rule this backend consults for `civil`. Ambiguity, candidates and
    /// default conversion of the same civil time must all use this rule.
    fn rule_for_civil(&self, civil: NaiveDateTime) -> Option<&AdjustmentRule> {
        self.active_rule(civil.year())
    }

    /// The active rule resolved for `year`.
    fn daylight_time(&self, year: i32) -> Option<DaylightTime> {
        self.active_rule(year).and_then(|rule| rule.daylight_time(year))
    }

    /// True iff `civil` falls inside a fall-back overlap.
    fn is_ambiguous(&self, civil: NaiveDateTime) -> bool;

    /// True iff `civil` falls inside a spring-forward gap.
    fn is_invalid(&self, civil: NaiveDateTime) -> bool;

    /// Offsets an ambiguous civil time could carry; empty when unambiguous.
    fn candidate_offsets(&self, civil: NaiveDateTime) -> Vec<FixedOffset>;

    /// Default conversion. Never fails; ambiguous input gets the backend's
    /// default hour and skipped input the standard offset.
    fn to_absolute(&self, civil: NaiveDateTime) -> DateTime<Utc>;

    fn to_civil(&self, instant: DateTime<Utc>) -> NaiveDateTime;

    fn is_daylight_saving_time(&self, civil: NaiveDateTime) -> bool;
}

/// Which backend a [`RuleSource`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Passthrough,
    AdjustmentTable,
    DaylightChanges,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::Passthrough,
        SourceKind::AdjustmentTable,
        SourceKind::DaylightChanges,
    ];

    pub fn description(self) -> &'static str {
        match self {
            SourceKind::Passthrough => "Unique UTC datetime",
            SourceKind::AdjustmentTable => "Adjustment table",
            SourceKind::DaylightChanges => "Daylight changes",
        }
    }

    /// Construct the backend of this kind over `zone`.
    pub fn build(self, zone: Arc<ZoneRules>) -> Box<dyn RuleSource> {
        match self {
            SourceKind::Passthrough => Box::new(Passthrough::new(zone.id())),
            SourceKind::AdjustmentTable => Box::new(AdjustmentTable::new(zone)),
            SourceKind::DaylightChanges => Box::new(DaylightChanges::new(zone)),
        }
    }
}
