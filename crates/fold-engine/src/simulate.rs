//! Walk the instants around a fall-back transition and compare every backend
//! against ground truth.
//!
//! For each instant the simulation reads the civil time through each rule
//! source, optionally shifts it to mimic a user edit, converts it back both
//! naively and through [`resolve`], and records whether each conversion lands
//! on the true instant. Nothing here prints; the rows are plain data for a
//! reporting layer.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::error::{FoldError, Result};
use crate::resolver::{resolve, ModificationAssumption};
use crate::source::{RuleSource, SourceKind};
use crate::zone::ZoneRules;

const LEAD_MINUTES: i64 = 135;
const TRAIL_MINUTES: i64 = 140;
const STEP_MINUTES: i64 = 10;

/// One backend's view of one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reading {
    pub source: SourceKind,
    pub local: NaiveDateTime,
    pub local_is_dst: bool,
    pub local_is_ambiguous: bool,
    /// `local` converted straight back.
    pub direct: DateTime<Utc>,
    /// The civil time after applying the simulated edit.
    pub manual_local: NaiveDateTime,
    pub manual_is_dst: bool,
    pub manual_is_ambiguous: bool,
    /// `manual_local` through the backend's default conversion.
    pub naive: DateTime<Utc>,
    /// `manual_local` through the resolver.
    pub resolved: DateTime<Utc>,
    pub direct_matches: bool,
    pub naive_matches: bool,
    pub resolved_matches: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationRow {
    pub instant: DateTime<Utc>,
    /// Ground truth: the instant precedes the fall-back transition.
    pub actually_daylight: bool,
    /// Some backend considers this instant's civil time ambiguous.
    pub might_be_ambiguous: bool,
    pub readings: Vec<Reading>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Simulation {
    pub zone: String,
    pub year: i32,
    pub policy: ModificationAssumption,
    pub shift_minutes: i64,
    /// The instant at which clocks fall back.
    pub transition: DateTime<Utc>,
    pub rows: Vec<SimulationRow>,
}

impl Simulation {
    /// Rows where `kind`'s resolver missed the true (shifted) instant.
    pub fn resolver_misses(&self, kind: SourceKind) -> usize {
        self.count(kind, |r| !r.resolved_matches)
    }

    /// Rows where `kind`'s default conversion missed the true (shifted) instant.
    pub fn naive_misses(&self, kind: SourceKind) -> usize {
        self.count(kind, |r| !r.naive_matches)
    }

    fn count(&self, kind: SourceKind, pred: impl Fn(&Reading) -> bool) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.readings.iter())
            .filter(|r| r.source == kind && pred(r))
            .count()
    }
}

/// Simulate the fall-back transition of `year` in `zone`.
///
/// # Errors
/// Returns `FoldError::NoApplicableRule` if the zone observes no daylight time
/// in `year`.
pub fn simulate_fall_back(
    zone: Arc<ZoneRules>,
    year: i32,
    policy: ModificationAssumption,
    shift_minutes: i64,
) -> Result<Simulation> {
    let daylight = zone
        .rule_for_year(year)
        .and_then(|rule| rule.daylight_time(year))
        .ok_or(FoldError::NoApplicableRule { year })?;
    let transition = (daylight.end - zone.daylight_offset(daylight.delta)).and_utc();
    tracing::debug!(zone = zone.id(), year, %transition, "simulating fall-back transition");

    let sources: Vec<Box<dyn RuleSource>> = SourceKind::ALL
        .into_iter()
        .map(|kind| kind.build(Arc::clone(&zone)))
        .collect();
    let shift = TimeDelta::minutes(shift_minutes);

    let mut rows = Vec::new();
    let mut instant = transition - TimeDelta::minutes(LEAD_MINUTES);
    let last = transition + TimeDelta::minutes(TRAIL_MINUTES);
    while instant <= last {
        rows.push(row(instant, instant < transition, shift, policy, &sources));
        instant += TimeDelta::minutes(STEP_MINUTES);
    }

    Ok(Simulation {
        zone: zone.id().to_string(),
        year,
        policy,
        shift_minutes,
        transition,
        rows,
    })
}

fn row(
    instant: DateTime<Utc>,
    actually_daylight: bool,
    shift: TimeDelta,
    policy: ModificationAssumption,
    sources: &[Box<dyn RuleSource>],
) -> SimulationRow {
    let might_be_ambiguous = sources
        .iter()
        .any(|s| s.is_ambiguous(s.to_civil(instant)));
    let readings = sources
        .iter()
        .map(|source| reading(source.as_ref(), instant, shift, policy))
        .collect();
    SimulationRow {
        instant,
        actually_daylight,
        might_be_ambiguous,
        readings,
    }
}

fn reading(
    source: &dyn RuleSource,
    instant: DateTime<Utc>,
    shift: TimeDelta,
    policy: ModificationAssumption,
) -> Reading {
    let local = source.to_civil(instant);
    let direct = source.to_absolute(local);

    let expected = instant + shift;
    let manual_local = source.to_civil(expected);
    let naive = source.to_absolute(manual_local);
    let resolved = resolve(manual_local, instant, policy, source);

    Reading {
        source: source.kind(),
        local,
        local_is_dst: source.is_daylight_saving_time(local),
        local_is_ambiguous: source.is_ambiguous(local),
        direct,
        manual_local,
        manual_is_dst: source.is_daylight_saving_time(manual_local),
        manual_is_ambiguous: source.is_ambiguous(manual_local),
        naive,
        resolved,
        direct_matches: direct == instant,
        naive_matches: naive == expected,
        resolved_matches: resolved == expected,
    }
}
