use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};

use super::{RuleSource, SourceKind};
use crate::rule::{AdjustmentRule, DaylightTime, LocalKind};
use crate::zone::{self, ZoneRules};

/// Rule-table backend that looks rules up by validity window.
///
/// Ambiguous civil times convert with the standard offset, i.e. the later of
/// the two instants. Candidate offsets are listed in ascending order.
#[derive(Debug, Clone)]
pub struct AdjustmentTable {
    zone: Arc<ZoneRules>,
}

impl AdjustmentTable {
    pub fn new(zone: Arc<ZoneRules>) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> &ZoneRules {
        &self.zone
    }

    fn daylight_for(&self, civil: NaiveDateTime) -> Option<DaylightTime> {
        self.rule_for_civil(civil)
            .and_then(|rule| rule.daylight_time(civil.year()))
    }

    fn classify(&self, civil: NaiveDateTime) -> Option<(LocalKind, DaylightTime)> {
        self.daylight_for(civil).map(|dt| (dt.classify(civil), dt))
    }
}

impl RuleSource for AdjustmentTable {
    fn id(&self) -> &str {
        self.zone.id()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::AdjustmentTable
    }

    fn defaults_to_daylight(&self) -> bool {
        false
    }

    fn active_rule(&self, year: i32) -> Option<&AdjustmentRule> {
        self.zone.rule_for_year(year)
    }

    fn rule_for_civil(&self, civil: NaiveDateTime) -> Option<&AdjustmentRule> {
        self.zone.rule_for_date(civil.date())
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
                let mut offsets = vec![self.zone.base_offset(), self.zone.daylight_offset(dt.delta)];
                offsets.sort_by_key(|o| o.local_minus_utc());
                offsets
            }
            _ => Vec::new(),
        }
    }

    fn to_absolute(&self, civil: NaiveDateTime) -> DateTime<Utc> {
        let daylight = self.daylight_for(civil);
        let offset = self.zone.offset_for(civil, daylight.as_ref(), false);
        zone::to_absolute(civil, offset)
    }

    fn to_civil(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        let standard = instant.naive_utc() + self.zone.base_offset();
        let daylight = self
            .zone
            .rule_for_date(standard.date())
            .and_then(|rule| rule.daylight_time(self.zone.standard_year(instant)));
        self.zone.civil_at(instant, daylight.as_ref())
    }

    fn is_daylight_saving_time(&self, civil: NaiveDateTime) -> bool {
        matches!(self.classify(civil), Some((LocalKind::Daylight, _)))
    }
}
