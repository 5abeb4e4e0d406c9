//! `dstfold` CLI: simulate and resolve ambiguous local times around DST
//! fall-back transitions.
//!
//! ## Usage
//!
//! ```sh
//! # Walk the 2024 fall-back transition in Berlin through every backend
//! dstfold simulate --zone Europe/Berlin --year 2024
//!
//! # Same, pretending every value was edited 30 minutes forwards
//! dstfold simulate -z Europe/Berlin -z America/New_York --shift-minutes 30 --policy to-the-future
//!
//! # Resolve one edited value
//! dstfold resolve --zone Europe/Berlin --local 2024-10-27T02:30 --old 2024-10-27T00:30:00Z
//!
//! # Inspect the catalog
//! dstfold zones
//! dstfold rules --zone "Eastern Standard Time"
//!
//! # Use additional zones from a JSON catalog
//! dstfold --catalog zones.json zones --json
//! ```
//!
//! Diagnostics go to stderr and are filtered by `RUST_LOG` (default `warn`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use fold_engine::simulate::Reading;
use fold_engine::{
    candidates, resolve_stamps, simulate_fall_back, Catalog, FoldError, ModificationAssumption,
    Simulation, SourceKind, Stamp, ZoneRules,
};

#[derive(Parser)]
#[command(
    name = "dstfold",
    version,
    about = "Resolve ambiguous local times around DST fall-back transitions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON zone catalog merged over the built-in zones
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare every backend against ground truth around a fall-back transition
    Simulate {
        /// Zone id or alias (repeatable; defaults to every zone in the catalog)
        #[arg(short, long = "zone")]
        zones: Vec<String>,
        /// Year of the transition (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,
        /// Tie-break policy for edited ambiguous values
        #[arg(short, long, default_value = "none")]
        policy: ModificationAssumption,
        /// Minutes to add to each value before converting it back
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        shift_minutes: i64,
        /// Emit the simulation rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve one edited civil time against the instant it replaces
    Resolve {
        /// Zone id or alias
        #[arg(short, long)]
        zone: String,
        /// The new civil time, e.g. 2024-10-27T02:30
        #[arg(long)]
        local: Stamp,
        /// The instant being replaced, e.g. 2024-10-27T00:30:00Z
        #[arg(long)]
        old: Stamp,
        /// Tie-break policy for edited ambiguous values
        #[arg(short, long, default_value = "none")]
        policy: ModificationAssumption,
        /// Which rule source to resolve against
        #[arg(short, long, value_enum, default_value_t = Backend::AdjustmentTable)]
        backend: Backend,
        /// Emit the candidates and result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the zones in the catalog
    Zones {
        /// Dump the catalog in its JSON file format
        #[arg(long)]
        json: bool,
    },
    /// Print the adjustment rules of one or more zones
    Rules {
        /// Zone id or alias (repeatable)
        #[arg(short, long = "zone", required = true)]
        zones: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Passthrough,
    AdjustmentTable,
    DaylightChanges,
}

impl From<Backend> for SourceKind {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Passthrough => SourceKind::Passthrough,
            Backend::AdjustmentTable => SourceKind::AdjustmentTable,
            Backend::DaylightChanges => SourceKind::DaylightChanges,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let catalog = Catalog::load(cli.catalog.as_deref()).context("Failed to load zone catalog")?;

    match cli.command {
        Commands::Simulate {
            zones,
            year,
            policy,
            shift_minutes,
            json,
        } => {
            let year = year.unwrap_or_else(|| Utc::now().year());
            let simulations = simulate_zones(&catalog, &zones, year, policy, shift_minutes);
            if json {
                println!("{}", serde_json::to_string_pretty(&simulations)?);
            } else {
                for simulation in &simulations {
                    print!("{}", render_simulation(simulation));
                }
            }
        }
        Commands::Resolve {
            zone,
            local,
            old,
            policy,
            backend,
            json,
        } => {
            let source = catalog.source(&zone, backend.into())?;
            let resolved = resolve_stamps(local, old, policy, source.as_ref())
                .context("Failed to resolve local time")?;
            if json {
                // Both stamps were accepted above, so `local` is civil.
                let civil = local.civil("local")?;
                let value = serde_json::json!({
                    "zone": source.id(),
                    "backend": SourceKind::from(backend),
                    "policy": policy,
                    "local": civil,
                    "ambiguous": source.is_ambiguous(civil),
                    "invalid": source.is_invalid(civil),
                    "candidates": candidates(civil, source.as_ref()),
                    "resolved": resolved,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", Stamp::Absolute(resolved));
            }
        }
        Commands::Zones { json } => {
            if json {
                println!("{}", catalog.to_json()?);
            } else {
                for zone in catalog.zones() {
                    println!("{}", describe_zone(zone));
                }
            }
        }
        Commands::Rules { zones } => {
            for name in &zones {
                match catalog.lookup(name) {
                    Ok(zone) => print!("{}", render_rules(&zone)),
                    Err(err) => tracing::warn!(zone = %name, %err, "skipping zone"),
                }
            }
        }
    }

    Ok(())
}

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `warn`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);
    if let Err(err) = tracing_subscriber::registry().with(filter).with(layer).try_init() {
        eprintln!("dstfold: tracing already initialised: {}", err);
    }
}

/// Simulate each requested zone, skipping (and logging) the ones that are
/// unknown or have no daylight time in `year`.
fn simulate_zones(
    catalog: &Catalog,
    names: &[String],
    year: i32,
    policy: ModificationAssumption,
    shift_minutes: i64,
) -> Vec<Simulation> {
    let names: Vec<String> = if names.is_empty() {
        catalog.ids().map(str::to_string).collect()
    } else {
        names.to_vec()
    };

    let mut simulations = Vec::new();
    for name in &names {
        let result = catalog
            .lookup(name)
            .and_then(|zone| simulate_fall_back(zone, year, policy, shift_minutes));
        match result {
            Ok(simulation) => simulations.push(simulation),
            Err(FoldError::NoApplicableRule { year }) => {
                tracing::warn!(zone = %name, year, "zone has no daylight time, skipping");
            }
            Err(err) => tracing::warn!(zone = %name, %err, "skipping zone"),
        }
    }
    simulations
}

// ---------------------------------------------------------------------------
// Plain-text rendering
// ---------------------------------------------------------------------------

const CELL_WIDTH: usize = 31;

fn render_simulation(sim: &Simulation) -> String {
    let mut out = format!(
        "{}: fall-back at {} UTC (policy {}, shift {:+} min)\n",
        sim.zone,
        sim.transition.format("%Y-%m-%d %H:%M"),
        sim.policy,
        sim.shift_minutes
    );

    let Some(first) = sim.rows.first() else {
        return out;
    };
    let mut header = format!("{:<7}", "UTC");
    let mut columns = format!("{:<7}", "");
    for reading in &first.readings {
        header.push_str(&format!(" | {:<w$}", reading.source.description(), w = CELL_WIDTH));
        columns.push_str(&format!(
            " | {:<9}{:<9}{:<7}{:<w$}",
            "local",
            "manual",
            "naive",
            "result",
            w = CELL_WIDTH - 25
        ));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(columns.trim_end());
    out.push('\n');

    for row in &sim.rows {
        let mut line = format!(
            "{} {}",
            row.instant.format("%H:%M"),
            flag(row.actually_daylight, "+", "-")
        );
        for reading in &row.readings {
            line.push_str(" | ");
            line.push_str(&render_reading(reading));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    for reading in &first.readings {
        out.push_str(&format!(
            "  {}: {} resolver misses, {} naive misses\n",
            reading.source.description(),
            sim.resolver_misses(reading.source),
            sim.naive_misses(reading.source)
        ));
    }
    out.push('\n');
    out
}

/// One backend's cell: `+`/`-` mark daylight/standard time, `!` an ambiguous
/// civil time and `x` a conversion that missed the true instant.
fn render_reading(r: &Reading) -> String {
    format!(
        "{} {}{} {} {}{} {}{} {}{}",
        r.local.format("%H:%M"),
        flag(r.local_is_dst, "+", "-"),
        flag(r.local_is_ambiguous, "!", " "),
        r.manual_local.format("%H:%M"),
        flag(r.manual_is_dst, "+", "-"),
        flag(r.manual_is_ambiguous, "!", " "),
        r.naive.format("%H:%M"),
        flag(r.naive_matches, " ", "x"),
        r.resolved.format("%H:%M"),
        flag(r.resolved_matches, " ", "x"),
    )
}

fn flag(set: bool, yes: &'static str, no: &'static str) -> &'static str {
    if set {
        yes
    } else {
        no
    }
}

fn describe_zone(zone: &ZoneRules) -> String {
    let offset = zone.base_offset();
    let mut line = format!("{} (UTC{})", zone.id(), offset);
    if !zone.aliases().is_empty() {
        line.push_str(&format!(" [{}]", zone.aliases().join(", ")));
    }
    if !zone.supports_daylight_saving_time() {
        line.push_str(" no DST");
    }
    line
}

fn render_rules(zone: &ZoneRules) -> String {
    if zone.rules().is_empty() {
        return format!("{} has no adjustment rules\n\n", zone.id());
    }
    let mut out = format!("{} adjustment rules\n", zone.id());
    for (index, rule) in zone.rules().iter().enumerate() {
        let delta = rule.daylight_delta();
        out.push_str(&format!("   Adjustment rule #{}\n", index + 1));
        out.push_str(&format!("      Start Date:   {}\n", rule.date_start()));
        out.push_str(&format!("      End Date:     {}\n", rule.date_end()));
        out.push_str(&format!(
            "      Time Change:  {}:{:02} hours\n",
            delta.num_hours(),
            delta.num_minutes() % 60
        ));
        out.push_str(&format!("      Annual Start: {}\n", rule.transition_start()));
        out.push_str(&format!("      Annual End:   {}\n", rule.transition_end()));
    }
    out.push('\n');
    out
}
