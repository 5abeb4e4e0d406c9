//! A timezone's base offset and its ordered list of adjustment rules.
//!
//! [`ZoneRules`] is the shared rule data behind both rule-table backends. It
//! validates the list once on construction and then answers the raw questions
//! (which rule, which offset) that the backends phrase in their own way.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::error::{FoldError, Result};
use crate::rule::{in_window, AdjustmentRule, DaylightTime, LocalKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRules {
    id: String,
    display_name: String,
    aliases: Vec<String>,
    base_offset: FixedOffset,
    rules: Vec<AdjustmentRule>,
}

impl ZoneRules {
    /// Build zone rules, rejecting overlapping or out-of-order validity windows
    /// and daylight offsets that cannot be represented.
    pub fn new(
        id: impl Into<String>,
        base_offset: FixedOffset,
        rules: Vec<AdjustmentRule>,
    ) -> Result<Self> {
        let id = id.into();
        for pair in rules.windows(2) {
            if pair[1].date_start() <= pair[0].date_end() {
                return Err(FoldError::InvalidRule(format!(
                    "{}: rule starting {} overlaps or precedes rule ending {}",
                    id,
                    pair[1].date_start(),
                    pair[0].date_end()
                )));
            }
        }
        for rule in &rules {
            let seconds = base_offset.local_minus_utc() as i64 + rule.daylight_delta().num_seconds();
            if FixedOffset::east_opt(seconds as i32).is_none() {
                return Err(FoldError::InvalidRule(format!(
                    "{}: daylight offset of {} seconds is out of range",
                    id, seconds
                )));
            }
        }
        Ok(Self {
            display_name: id.clone(),
            id,
            aliases: Vec::new(),
            base_offset,
            rules,
        })
    }

    /// A zone that never observes daylight time.
    pub fn fixed(id: impl Into<String>, base_offset: FixedOffset) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            aliases: Vec::new(),
            base_offset,
            rules: Vec::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Case-insensitive match against the id or any alias.
    pub fn answers_to(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    pub fn base_offset(&self) -> FixedOffset {
        self.base_offset
    }

    pub fn rules(&self) -> &[AdjustmentRule] {
        &self.rules
    }

    pub fn supports_daylight_saving_time(&self) -> bool {
        !self.rules.is_empty()
    }

    /// The rule whose validity window contains `date`.
    pub fn rule_for_date(&self, date: NaiveDate) -> Option<&AdjustmentRule> {
        let rule = self.rules.iter().rev().find(|r| r.contains_date(date));
        tracing::trace!(zone = %self.id, %date, found = rule.is_some(), "rule lookup by date");
        rule
    }

    /// The last rule whose validity window touches `year`.
    pub fn rule_for_year(&self, year: i32) -> Option<&AdjustmentRule> {
        let rule = self.rules.iter().rev().find(|r| r.covers_year(year));
        tracing::trace!(zone = %self.id, year, found = rule.is_some(), "rule lookup by year");
        rule
    }

    /// Offset in effect when daylight time with `delta` applies.
    pub fn daylight_offset(&self, delta: TimeDelta) -> FixedOffset {
        let seconds = self.base_offset.local_minus_utc() as i64 + delta.num_seconds();
        // Representability was checked for every rule delta in `new`.
        FixedOffset::east_opt(seconds as i32).unwrap_or(self.base_offset)
    }

    /// Offset for a civil time under `daylight`; ambiguous civil times take the
    /// daylight offset only when `ambiguous_as_daylight` is set, skipped ones
    /// always take the standard offset.
    pub(crate) fn offset_for(
        &self,
        civil: NaiveDateTime,
        daylight: Option<&DaylightTime>,
        ambiguous_as_daylight: bool,
    ) -> FixedOffset {
        let Some(daylight) = daylight else {
            return self.base_offset;
        };
        match daylight.classify(civil) {
            LocalKind::Daylight => self.daylight_offset(daylight.delta),
            LocalKind::Ambiguous if ambiguous_as_daylight => self.daylight_offset(daylight.delta),
            LocalKind::Ambiguous | LocalKind::Standard | LocalKind::Skipped => self.base_offset,
        }
    }

    /// Wall-clock time at `instant`. Every instant has exactly one civil time.
    pub(crate) fn civil_at(&self, instant: DateTime<Utc>, daylight: Option<&DaylightTime>) -> NaiveDateTime {
        let standard = instant.naive_utc() + self.base_offset;
        let Some(daylight) = daylight else {
            return standard;
        };
        let utc = instant.naive_utc();
        let start_utc = daylight.start - self.base_offset;
        let end_utc = daylight.end - self.daylight_offset(daylight.delta);
        if in_window(utc, start_utc, end_utc) {
            utc + self.daylight_offset(daylight.delta)
        } else {
            standard
        }
    }

    /// Year of the standard-time civil reading of `instant`, used to pick the
    /// daylight period that decides the instant's offset.
    pub(crate) fn standard_year(&self, instant: DateTime<Utc>) -> i32 {
        (instant.naive_utc() + self.base_offset).year()
    }
}

pub(crate) fn to_absolute(civil: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    (civil - offset).and_utc()
}
