//! Adjustment rules and the yearly transition-date arithmetic behind them.
//!
//! An [`AdjustmentRule`] says "between these two calendar dates, daylight time
//! adds `delta` to the base offset, starting and ending on these
//! [`TransitionRule`]s each year". Resolving a rule for one year yields a
//! [`DaylightTime`], which classifies civil times as standard, daylight,
//! ambiguous (fall-back overlap) or skipped (spring-forward gap).
//!
//! Start transitions are expressed in standard civil time and end transitions
//! in daylight civil time, so a European rule ending at 03:00 produces the
//! ambiguous civil hour `[02:00, 03:00)`.

use std::fmt;

use chrono::{Datelike, Month, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{FoldError, Result};

/// Ordinal week of a floating transition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    /// The last matching weekday of the month, whether it is the 4th or 5th.
    Last,
}

impl WeekOfMonth {
    /// Maps the registry-style week number (1–4, 5 meaning "last").
    pub fn from_number(week: u8) -> Option<Self> {
        match week {
            1 => Some(WeekOfMonth::First),
            2 => Some(WeekOfMonth::Second),
            3 => Some(WeekOfMonth::Third),
            4 => Some(WeekOfMonth::Fourth),
            5 => Some(WeekOfMonth::Last),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekOfMonth::First => "first",
            WeekOfMonth::Second => "second",
            WeekOfMonth::Third => "third",
            WeekOfMonth::Fourth => "fourth",
            WeekOfMonth::Last => "last",
        }
    }

    fn ordinal(self) -> Option<i64> {
        match self {
            WeekOfMonth::First => Some(1),
            WeekOfMonth::Second => Some(2),
            WeekOfMonth::Third => Some(3),
            WeekOfMonth::Fourth => Some(4),
            WeekOfMonth::Last => None,
        }
    }
}

/// The yearly moment at which daylight time starts or ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransitionRule {
    /// A fixed calendar date. Days past the end of the month clamp to the last day.
    Fixed {
        month: u32,
        day: u32,
        time: NaiveTime,
    },
    /// The n-th (or last) given weekday of a month.
    Floating {
        month: u32,
        week: WeekOfMonth,
        weekday: Weekday,
        time: NaiveTime,
    },
}

impl TransitionRule {
    pub fn fixed(month: u32, day: u32, time: NaiveTime) -> Result<Self> {
        let rule = TransitionRule::Fixed { month, day, time };
        rule.validate()?;
        Ok(rule)
    }

    pub fn floating(month: u32, week: WeekOfMonth, weekday: Weekday, time: NaiveTime) -> Result<Self> {
        let rule = TransitionRule::Floating {
            month,
            week,
            weekday,
            time,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn month(&self) -> u32 {
        match *self {
            TransitionRule::Fixed { month, .. } | TransitionRule::Floating { month, .. } => month,
        }
    }

    pub fn time(&self) -> NaiveTime {
        match *self {
            TransitionRule::Fixed { time, .. } | TransitionRule::Floating { time, .. } => time,
        }
    }

    pub fn is_fixed_date_rule(&self) -> bool {
        matches!(self, TransitionRule::Fixed { .. })
    }

    pub fn validate(&self) -> Result<()> {
        let month = self.month();
        if !(1..=12).contains(&month) {
            return Err(FoldError::InvalidRule(format!("month {} out of range 1-12", month)));
        }
        if let TransitionRule::Fixed { day, .. } = *self {
            if !(1..=31).contains(&day) {
                return Err(FoldError::InvalidRule(format!("day {} out of range 1-31", day)));
            }
        }
        Ok(())
    }

    /// Resolve the rule to a concrete civil date-time in `year`.
    ///
    /// Returns `None` only when the year is outside chrono's supported range.
    pub fn to_datetime(&self, year: i32) -> Option<NaiveDateTime> {
        let date = match *self {
            TransitionRule::Fixed { month, day, .. } => {
                let last = days_in_month(year, month)?;
                NaiveDate::from_ymd_opt(year, month, day.min(last))?
            }
            TransitionRule::Floating {
                month,
                week,
                weekday,
                ..
            } => match week.ordinal() {
                Some(n) => {
                    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
                    let mut delta = (weekday.num_days_from_sunday() as i64
                        - first.weekday().num_days_from_sunday() as i64)
                        .rem_euclid(7);
                    delta += 7 * (n - 1);
                    first + TimeDelta::days(delta)
                }
                None => {
                    let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)?)?;
                    let delta = (last.weekday().num_days_from_sunday() as i64
                        - weekday.num_days_from_sunday() as i64)
                        .rem_euclid(7);
                    last - TimeDelta::days(delta)
                }
            },
        };
        Some(date.and_time(self.time()))
    }
}

impl fmt::Display for TransitionRule {
    /// "On October 15 at 03:00" or "The last Sunday of October at 03:00".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = u8::try_from(self.month())
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("?", |m| m.name());
        let time = self.time().format("%H:%M");
        match *self {
            TransitionRule::Fixed { day, .. } => write!(f, "On {} {} at {}", month, day, time),
            TransitionRule::Floating { week, weekday, .. } => write!(
                f,
                "The {} {} of {} at {}",
                week.as_str(),
                weekday_name(weekday),
                month,
                time
            ),
        }
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Number of days in `month` of `year`, or `None` for an invalid month/year.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// A daylight-saving policy valid for an inclusive range of calendar dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentRule {
    date_start: NaiveDate,
    date_end: NaiveDate,
    daylight_delta: TimeDelta,
    transition_start: TransitionRule,
    transition_end: TransitionRule,
}

impl AdjustmentRule {
    pub fn new(
        date_start: NaiveDate,
        date_end: NaiveDate,
        daylight_delta: TimeDelta,
        transition_start: TransitionRule,
        transition_end: TransitionRule,
    ) -> Result<Self> {
        if date_start > date_end {
            return Err(FoldError::InvalidRule(format!(
                "window starts {} after it ends {}",
                date_start, date_end
            )));
        }
        if daylight_delta <= TimeDelta::zero() {
            return Err(FoldError::InvalidRule(format!(
                "daylight delta must be positive, got {} minutes",
                daylight_delta.num_minutes()
            )));
        }
        transition_start.validate()?;
        transition_end.validate()?;
        Ok(Self {
            date_start,
            date_end,
            daylight_delta,
            transition_start,
            transition_end,
        })
    }

    pub fn date_start(&self) -> NaiveDate {
        self.date_start
    }

    pub fn date_end(&self) -> NaiveDate {
        self.date_end
    }

    pub fn daylight_delta(&self) -> TimeDelta {
        self.daylight_delta
    }

    pub fn transition_start(&self) -> TransitionRule {
        self.transition_start
    }

    pub fn transition_end(&self) -> TransitionRule {
        self.transition_end
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.date_start <= date && date <= self.date_end
    }

    pub fn covers_year(&self, year: i32) -> bool {
        self.date_start.year() <= year && year <= self.date_end.year()
    }

    /// Resolve this rule's transitions for `year`.
    pub fn daylight_time(&self, year: i32) -> Option<DaylightTime> {
        Some(DaylightTime {
            start: self.transition_start.to_datetime(year)?,
            end: self.transition_end.to_datetime(year)?,
            delta: self.daylight_delta,
        })
    }
}

/// How a civil time relates to one year's daylight period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalKind {
    Standard,
    Daylight,
    /// Inside the fall-back overlap; occurs once in daylight and once in standard time.
    Ambiguous,
    /// Inside the spring-forward gap; never occurs on the wall clock.
    Skipped,
}

/// An adjustment rule resolved to concrete civil date-times for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaylightTime {
    /// Civil standard time at which clocks move forward.
    pub start: NaiveDateTime,
    /// Civil daylight time at which clocks move back.
    pub end: NaiveDateTime,
    pub delta: TimeDelta,
}

impl DaylightTime {
    pub fn classify(&self, civil: NaiveDateTime) -> LocalKind {
        let gap_end = self.start + self.delta;
        let overlap_start = self.end - self.delta;
        if self.start <= civil && civil < gap_end {
            LocalKind::Skipped
        } else if overlap_start <= civil && civil < self.end {
            LocalKind::Ambiguous
        } else if in_window(civil, gap_end, overlap_start) {
            LocalKind::Daylight
        } else {
            LocalKind::Standard
        }
    }

    pub fn is_ambiguous(&self, civil: NaiveDateTime) -> bool {
        self.classify(civil) == LocalKind::Ambiguous
    }

    pub fn is_skipped(&self, civil: NaiveDateTime) -> bool {
        self.classify(civil) == LocalKind::Skipped
    }
}

/// Half-open window check that wraps around the year boundary when `from > to`,
/// as southern-hemisphere daylight periods do.
pub(crate) fn in_window<T: PartialOrd>(value: T, from: T, to: T) -> bool {
    if from <= to {
        from <= value && value < to
    } else {
        value >= from || value < to
    }
}
