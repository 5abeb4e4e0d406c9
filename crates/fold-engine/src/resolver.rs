//! Resolve an edited, possibly ambiguous civil time to the most plausible instant.
//!
//! During a fall-back transition a civil time such as 02:30 occurs twice. When
//! a value that was stored as an absolute instant is shown to a user as civil
//! time and comes back, the civil value alone cannot say which of the two
//! instants it means. [`resolve`] uses the instant it replaces to decide:
//!
//! 1. An unchanged value maps back onto the old instant, whichever hour it sat in.
//! 2. A changed value is matched against the configured
//!    [`ModificationAssumption`].
//! 3. Anything still undecided takes the backend's default conversion.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FoldError, Result};
use crate::source::RuleSource;
use crate::stamp::Stamp;

/// Tie-break policy for a genuinely edited ambiguous civil time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModificationAssumption {
    /// No knowledge of the edit; use the backend default.
    #[default]
    None,
    /// Values only ever move backwards.
    ToThePast,
    /// Values only ever move forwards.
    ToTheFuture,
    /// Values move backwards by small amounts; otherwise keep the later hour.
    SmallToThePast,
    /// Values move forwards by small amounts; otherwise keep the earlier hour.
    SmallToTheFuture,
    /// Pick whichever candidate is closest to the old instant.
    SmallestAdjustment,
}

impl ModificationAssumption {
    pub const ALL: [ModificationAssumption; 6] = [
        ModificationAssumption::None,
        ModificationAssumption::ToThePast,
        ModificationAssumption::ToTheFuture,
        ModificationAssumption::SmallToThePast,
        ModificationAssumption::SmallToTheFuture,
        ModificationAssumption::SmallestAdjustment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModificationAssumption::None => "none",
            ModificationAssumption::ToThePast => "to-the-past",
            ModificationAssumption::ToTheFuture => "to-the-future",
            ModificationAssumption::SmallToThePast => "small-to-the-past",
            ModificationAssumption::SmallToTheFuture => "small-to-the-future",
            ModificationAssumption::SmallestAdjustment => "smallest-adjustment",
        }
    }
}

impl fmt::Display for ModificationAssumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModificationAssumption {
    type Err = FoldError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| FoldError::UnknownAssumption(s.to_string()))
    }
}

/// The two instants an ambiguous civil time could denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidates {
    /// The backend's default conversion.
    pub naive: DateTime<Utc>,
    /// The other hour: `naive` shifted by the daylight delta away from the default.
    pub alternate: DateTime<Utc>,
    /// The daylight-time reading.
    pub earlier: DateTime<Utc>,
    /// The standard-time reading.
    pub later: DateTime<Utc>,
}

impl Candidates {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant == self.earlier || instant == self.later
    }
}

/// Both readings of `new_local`, or `None` when it is not ambiguous (or the
/// source has no rule for its year).
pub fn candidates(new_local: NaiveDateTime, source: &dyn RuleSource) -> Option<Candidates> {
    if !source.is_ambiguous(new_local) {
        return None;
    }
    ambiguous_candidates(new_local, source).ok()
}

fn ambiguous_candidates(new_local: NaiveDateTime, source: &dyn RuleSource) -> Result<Candidates> {
    let rule = source
        .rule_for_civil(new_local)
        .ok_or(FoldError::NoApplicableRule {
            year: new_local.year(),
        })?;
    let delta = rule.daylight_delta();
    let naive = source.to_absolute(new_local);

    Ok(if source.defaults_to_daylight() {
        let alternate = naive + delta;
        Candidates {
            naive,
            alternate,
            earlier: naive,
            later: alternate,
        }
    } else {
        let alternate = naive - delta;
        Candidates {
            naive,
            alternate,
            earlier: alternate,
            later: naive,
        }
    })
}

/// Return the most plausible instant for `new_local`, which replaces
/// `old_absolute`.
///
/// Unambiguous civil times convert exactly. For ambiguous ones the result is
/// always one of the two [`Candidates`].
pub fn resolve(
    new_local: NaiveDateTime,
    old_absolute: DateTime<Utc>,
    policy: ModificationAssumption,
    source: &dyn RuleSource,
) -> DateTime<Utc> {
    if !source.is_ambiguous(new_local) {
        return source.to_absolute(new_local);
    }

    let c = match ambiguous_candidates(new_local, source) {
        Ok(c) => c,
        Err(err) => {
            tracing::warn!(
                zone = source.id(),
                %new_local,
                %err,
                "ambiguous time without rule, using default conversion"
            );
            return source.to_absolute(new_local);
        }
    };

    // Unchanged values: whichever reading reproduces the old instant wins.
    if c.naive == old_absolute {
        tracing::debug!(zone = source.id(), %new_local, "unchanged value in default hour");
        return c.naive;
    }
    if c.alternate == old_absolute {
        tracing::debug!(zone = source.id(), %new_local, "unchanged value in alternate hour");
        return c.alternate;
    }

    match most_likely(&c, old_absolute, policy) {
        Some(resolved) => {
            tracing::debug!(
                zone = source.id(),
                %new_local,
                %policy,
                %resolved,
                "resolved by policy"
            );
            resolved
        }
        None => {
            tracing::debug!(
                zone = source.id(),
                %new_local,
                %policy,
                naive = %c.naive,
                "falling back to default conversion"
            );
            c.naive
        }
    }
}

/// [`resolve`] for values whose kind is only known at runtime.
///
/// # Errors
/// Returns `FoldError::InvalidArgumentKind` if `new_local` is not a civil time
/// or `old_absolute` is not an absolute instant.
pub fn resolve_stamps(
    new_local: Stamp,
    old_absolute: Stamp,
    policy: ModificationAssumption,
    source: &dyn RuleSource,
) -> Result<DateTime<Utc>> {
    let new_local = new_local.civil("new_local")?;
    let old_absolute = old_absolute.absolute("old_absolute")?;
    Ok(resolve(new_local, old_absolute, policy, source))
}

/// Apply `policy` to a value known to have been edited.
fn most_likely(
    c: &Candidates,
    old: DateTime<Utc>,
    policy: ModificationAssumption,
) -> Option<DateTime<Utc>> {
    use ModificationAssumption as M;

    let brackets_old = c.earlier < old && old < c.later;
    match policy {
        M::ToThePast | M::SmallToThePast if brackets_old => return Some(c.earlier),
        M::ToTheFuture | M::SmallToTheFuture if brackets_old => return Some(c.later),
        M::SmallestAdjustment => {
            let to_earlier = (old - c.earlier).abs();
            let to_later = (old - c.later).abs();
            return Some(if to_earlier <= to_later { c.earlier } else { c.later });
        }
        _ => {}
    }

    match policy {
        // Both readings lie before the old value; keep the one nearest to it.
        M::SmallToThePast => Some(c.later),
        // Both readings lie after the old value; keep the one nearest to it.
        M::SmallToTheFuture => Some(c.earlier),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 27, h, m, 0).unwrap()
    }

    fn pair() -> Candidates {
        Candidates {
            naive: utc(1, 30),
            alternate: utc(0, 30),
            earlier: utc(0, 30),
            later: utc(1, 30),
        }
    }

    #[test]
    fn none_policy_leaves_decision_to_caller() {
        assert_eq!(most_likely(&pair(), utc(1, 0), ModificationAssumption::None), None);
    }

    #[test]
    fn directional_policies_need_bracketing() {
        let c = pair();
        assert_eq!(
            most_likely(&c, utc(1, 0), ModificationAssumption::ToThePast),
            Some(utc(0, 30))
        );
        assert_eq!(most_likely(&c, utc(3, 0), ModificationAssumption::ToThePast), None);
        assert_eq!(
            most_likely(&c, utc(1, 0), ModificationAssumption::ToTheFuture),
            Some(utc(1, 30))
        );
        assert_eq!(most_likely(&c, utc(0, 0), ModificationAssumption::ToTheFuture), None);
    }

    #[test]
    fn small_policies_fall_through_to_nearest_hour() {
        let c = pair();
        assert_eq!(
            most_likely(&c, utc(3, 0), ModificationAssumption::SmallToThePast),
            Some(utc(1, 30))
        );
        assert_eq!(
            most_likely(&c, utc(0, 0), ModificationAssumption::SmallToTheFuture),
            Some(utc(0, 30))
        );
    }

    #[test]
    fn smallest_adjustment_tie_goes_to_earlier() {
        assert_eq!(
            most_likely(&pair(), utc(1, 0), ModificationAssumption::SmallestAdjustment),
            Some(utc(0, 30))
        );
    }

    #[test]
    fn policy_names_parse() {
        for policy in ModificationAssumption::ALL {
            assert_eq!(policy.as_str().parse::<ModificationAssumption>().unwrap(), policy);
        }
        assert_eq!(
            "Smallest_Adjustment".parse::<ModificationAssumption>().unwrap(),
            ModificationAssumption::SmallestAdjustment
        );
        assert!("sideways".parse::<ModificationAssumption>().is_err());
    }
}
