//! Timezone lookup by identifier.
//!
//! A [`Catalog`] maps zone identifiers (and IANA-style aliases) to
//! [`ZoneRules`]. It starts from a small built-in set and can be extended or
//! overridden by a JSON file:
//!
//! ```json
//! {
//!   "zones": [{
//!     "id": "W. Europe Standard Time",
//!     "aliases": ["Europe/Berlin"],
//!     "base_offset_minutes": 60,
//!     "rules": [{
//!       "date_start": "0001-01-01",
//!       "date_end": "9999-12-31",
//!       "daylight_delta_minutes": 60,
//!       "start": { "kind": "floating", "month": 3, "week": "last", "weekday": "Sun", "time": "02:00:00" },
//!       "end": { "kind": "floating", "month": 10, "week": "last", "weekday": "Sun", "time": "03:00:00" }
//!     }]
//!   }]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{FoldError, Result};
use crate::rule::{AdjustmentRule, TransitionRule, WeekOfMonth};
use crate::source::{RuleSource, SourceKind};
use crate::zone::ZoneRules;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for the catalog file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    pub zones: Vec<ZoneEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub base_offset_minutes: i32,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub daylight_delta_minutes: i64,
    pub start: TransitionRule,
    pub end: TransitionRule,
}

impl ZoneEntry {
    fn into_zone(self) -> Result<ZoneRules> {
        let base_offset = FixedOffset::east_opt(self.base_offset_minutes * 60).ok_or_else(|| {
            FoldError::Catalog(format!(
                "{}: base offset of {} minutes is out of range",
                self.id, self.base_offset_minutes
            ))
        })?;
        let rules = self
            .rules
            .into_iter()
            .map(|r| {
                AdjustmentRule::new(
                    r.date_start,
                    r.date_end,
                    TimeDelta::minutes(r.daylight_delta_minutes),
                    r.start,
                    r.end,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let display_name = self.display_name.unwrap_or_else(|| self.id.clone());
        Ok(ZoneRules::new(self.id, base_offset, rules)?
            .with_display_name(display_name)
            .with_aliases(self.aliases))
    }
}

impl From<&ZoneRules> for ZoneEntry {
    fn from(zone: &ZoneRules) -> Self {
        Self {
            id: zone.id().to_string(),
            display_name: (zone.display_name() != zone.id()).then(|| zone.display_name().to_string()),
            aliases: zone.aliases().to_vec(),
            base_offset_minutes: zone.base_offset().local_minus_utc() / 60,
            rules: zone
                .rules()
                .iter()
                .map(|r| RuleEntry {
                    date_start: r.date_start(),
                    date_end: r.date_end(),
                    daylight_delta_minutes: r.daylight_delta().num_minutes(),
                    start: r.transition_start(),
                    end: r.transition_end(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    zones: Vec<Arc<ZoneRules>>,
}

impl Catalog {
    /// The built-in zones, optionally overlaid with the JSON catalog at `path`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut catalog = Self::builtin()?;
        if let Some(path) = path {
            catalog.merge(Self::from_file(path)?);
        }
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| FoldError::Catalog(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| FoldError::Catalog(e.to_string()))?;
        Self::from_entries(file.zones)
    }

    pub fn from_entries(entries: Vec<ZoneEntry>) -> Result<Self> {
        let zones = entries
            .into_iter()
            .map(|entry| entry.into_zone().map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { zones })
    }

    pub fn to_json(&self) -> Result<String> {
        let file = CatalogFile {
            zones: self.zones.iter().map(|z| ZoneEntry::from(z.as_ref())).collect(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| FoldError::Catalog(e.to_string()))
    }

    /// Add the zones of `other`, replacing any with the same id.
    pub fn merge(&mut self, other: Catalog) {
        for zone in other.zones {
            match self.zones.iter_mut().find(|z| z.id() == zone.id()) {
                Some(existing) => *existing = zone,
                None => self.zones.push(zone),
            }
        }
    }

    pub fn zones(&self) -> &[Arc<ZoneRules>] {
        &self.zones
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(|z| z.id())
    }

    /// Find a zone by id or alias, case-insensitively.
    ///
    /// # Errors
    /// Returns `FoldError::UnknownTimezone` if nothing answers to `name`.
    pub fn lookup(&self, name: &str) -> Result<Arc<ZoneRules>> {
        self.zones
            .iter()
            .find(|z| z.answers_to(name))
            .cloned()
            .ok_or_else(|| FoldError::UnknownTimezone(name.to_string()))
    }

    pub fn source(&self, name: &str, kind: SourceKind) -> Result<Box<dyn RuleSource>> {
        Ok(kind.build(self.lookup(name)?))
    }

    /// One source of every kind for the named zone.
    pub fn sources(&self, name: &str) -> Result<Vec<Box<dyn RuleSource>>> {
        let zone = self.lookup(name)?;
        Ok(SourceKind::ALL
            .into_iter()
            .map(|kind| kind.build(Arc::clone(&zone)))
            .collect())
    }

    /// Zones modelled on the system registry entries the comparisons were
    /// first run against.
    pub fn builtin() -> Result<Self> {
        let always = (date(1, 1, 1), date(9999, 12, 31));
        Self::from_entries(vec![
            ZoneEntry {
                id: "UTC".to_string(),
                display_name: Some("(UTC) Coordinated Universal Time".to_string()),
                aliases: vec!["Etc/UTC".to_string()],
                base_offset_minutes: 0,
                rules: Vec::new(),
            },
            ZoneEntry {
                id: "W. Europe Standard Time".to_string(),
                display_name: Some("(UTC+01:00) Amsterdam, Berlin, Bern, Rome, Stockholm, Vienna".to_string()),
                aliases: aliases(&["Europe/Berlin", "Europe/Amsterdam", "Europe/Rome", "Europe/Vienna"]),
                base_offset_minutes: 60,
                rules: vec![rule(
                    always,
                    60,
                    last(3, Weekday::Sun, 2),
                    last(10, Weekday::Sun, 3),
                )],
            },
            ZoneEntry {
                id: "GMT Standard Time".to_string(),
                display_name: Some("(UTC+00:00) Dublin, Edinburgh, Lisbon, London".to_string()),
                aliases: aliases(&["Europe/London", "Europe/Lisbon"]),
                base_offset_minutes: 0,
                rules: vec![rule(
                    always,
                    60,
                    last(3, Weekday::Sun, 1),
                    last(10, Weekday::Sun, 2),
                )],
            },
            ZoneEntry {
                id: "Eastern Standard Time".to_string(),
                display_name: Some("(UTC-05:00) Eastern Time (US & Canada)".to_string()),
                aliases: aliases(&["America/New_York", "America/Toronto"]),
                base_offset_minutes: -300,
                rules: vec![
                    rule(
                        (date(1, 1, 1), date(2006, 12, 31)),
                        60,
                        nth(4, WeekOfMonth::First, Weekday::Sun, 2),
                        last(10, Weekday::Sun, 2),
                    ),
                    rule(
                        (date(2007, 1, 1), date(9999, 12, 31)),
                        60,
                        nth(3, WeekOfMonth::Second, Weekday::Sun, 2),
                        nth(11, WeekOfMonth::First, Weekday::Sun, 2),
                    ),
                ],
            },
            ZoneEntry {
                id: "Cen. Australia Standard Time".to_string(),
                display_name: Some("(UTC+09:30) Adelaide".to_string()),
                aliases: aliases(&["Australia/Adelaide"]),
                base_offset_minutes: 570,
                rules: vec![
                    rule(
                        (date(1, 1, 1), date(2007, 12, 31)),
                        60,
                        last(10, Weekday::Sun, 2),
                        last(3, Weekday::Sun, 3),
                    ),
                    rule(
                        (date(2008, 1, 1), date(9999, 12, 31)),
                        60,
                        nth(10, WeekOfMonth::First, Weekday::Sun, 2),
                        nth(4, WeekOfMonth::First, Weekday::Sun, 3),
                    ),
                ],
            },
        ])
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default()
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn last(month: u32, weekday: Weekday, hour: u32) -> TransitionRule {
    nth(month, WeekOfMonth::Last, weekday, hour)
}

fn nth(month: u32, week: WeekOfMonth, weekday: Weekday, hour: u32) -> TransitionRule {
    TransitionRule::Floating {
        month,
        week,
        weekday,
        time: at(hour),
    }
}

fn rule(
    (date_start, date_end): (NaiveDate, NaiveDate),
    delta_minutes: i64,
    start: TransitionRule,
    end: TransitionRule,
) -> RuleEntry {
    RuleEntry {
        date_start,
        date_end,
        daylight_delta_minutes: delta_minutes,
        start,
        end,
    }
}
