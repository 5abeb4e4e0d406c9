//! # fold-engine
//!
//! Deterministic resolution of ambiguous local times around DST fall-back transitions.
//!
//! When clocks fall back, an hour of wall-clock time happens twice. A value
//! stored as an absolute instant, shown to a user as local time and handed back
//! (edited or not) can therefore mean either of two instants. The engine
//! decides which one, using the instant the value replaces and a configurable
//! [`ModificationAssumption`].
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use fold_engine::{resolve, Catalog, ModificationAssumption, SourceKind};
//!
//! let catalog = Catalog::builtin().unwrap();
//! let berlin = catalog.source("Europe/Berlin", SourceKind::AdjustmentTable).unwrap();
//!
//! // 02:30 on 2024-10-27 happens at 00:30Z and again at 01:30Z.
//! let local = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap().and_hms_opt(2, 30, 0).unwrap();
//! let old = Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap();
//!
//! let resolved = resolve(local, old, ModificationAssumption::None, berlin.as_ref());
//! assert_eq!(resolved, old);
//! ```
//!
//! ## Modules
//!
//! - [`resolver`]: edited civil time + replaced instant → most plausible instant
//! - [`source`]: the `RuleSource` interface and its three backends
//! - [`rule`]: adjustment rules and transition-date arithmetic
//! - [`zone`]: a zone's base offset and ordered rule list
//! - [`catalog`]: lookup by identifier, built-in zones and JSON catalogs
//! - [`simulate`]: ground-truth comparison around a transition
//! - [`stamp`]: civil/absolute values tagged at runtime
//! - [`error`]: Error types

pub mod catalog;
pub mod error;
pub mod resolver;
pub mod rule;
pub mod simulate;
pub mod source;
pub mod stamp;
pub mod zone;

pub use catalog::Catalog;
pub use error::{FoldError, Result};
pub use resolver::{candidates, resolve, resolve_stamps, Candidates, ModificationAssumption};
pub use rule::{AdjustmentRule, DaylightTime, LocalKind, TransitionRule, WeekOfMonth};
pub use simulate::{simulate_fall_back, Simulation};
pub use source::{AdjustmentTable, DaylightChanges, Passthrough, RuleSource, SourceKind};
pub use stamp::Stamp;
pub use zone::ZoneRules;
