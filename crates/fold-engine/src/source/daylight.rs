use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};

use super::{RuleSource, SourceKind};
use crate::rule::{AdjustmentRule, DaylightTime, LocalKind};
use crate::zone::{self, ZoneRules};

/// Rule-table backend that resolves one set of daylight changes per year.
///
/// Ambiguous civil times convert with the daylight offset, i.e. the earlier of
/// the two instants, and are reported as daylight time. Candidate offsets list
/// that default first.
#[derive(Debug, Clone)]
pub struct DaylightChanges {
    zone: Arc<ZoneRules>,
}

impl DaylightChanges {
    pub fn new(zone: Arc<ZoneRules>) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> &ZoneRules {
        &self.zone
    }

    /// The daylight period for `year`, if the zone observes one.
    pub fn daylight_changes(&self, year: i32) -> Option<DaylightTime> {
        self.zone
            .rule_for_year(year)
            .and_then(|rule| rule.daylight_time(year))
    }

    fn classify(&self, civil: NaiveDateTime) -> Option<(LocalKind, DaylightTime)> {
        self.daylight_changes(civil.year())
            .map(|dt| (dt.classify(civil), dt))
    }
}

impl RuleSource for DaylightChanges {
    fn id(&self) -> &str {
        self.zone.id()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::DaylightChanges
    }

    fn defaults_to_daylight(&self) -> bool {
        true
    }

    fn active_rule(&self, year: i32) -> Option<&AdjustmentRule> {
        self.zone.rule_for_year(year)
    }

    fn is_ambiguous(&self, civil: NaiveDateTime) -> bool {
        matches!(self.classify(civil), Some((LocalKind::Ambiguous, _)))
    }

    fn is_invalid(&self, civil: NaiveDateTime) -> bool {
        matches!(self.classify(civil), Some((LocalKind::Skipped, _)))
    }

    fn candidate_offsets(&self, civil: NaiveDateTime) -> Vec<FixedOffset> {
        match self.classify(civil) {
            Some((LocalKind::Ambiguous, dt)) => {
                vec![self.zone.daylight_offset(dt.delta), self.zone.base_offset()]
            }
            _ => Vec::new(),
        }
    }

    fn to_absolute(&self, civil: NaiveDateTime) -> DateTime<Utc> {
        let daylight = self.daylight_changes(civil.year());
        let offset = self.zone.offset_for(civil, daylight.as_ref(), true);
        zone::to_absolute(civil, offset)
    }

    fn to_civil(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        let daylight = self.daylight_changes(self.zone.standard_year(instant));
        self.zone.civil_at(instant, daylight.as_ref())
    }

    fn is_daylight_saving_time(&self, civil: NaiveDateTime) -> bool {
        matches!(
            self.classify(civil),
            Some((LocalKind::Daylight | LocalKind::Ambiguous, _))
        )
    }
}
