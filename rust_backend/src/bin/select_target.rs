//! Select the next target to observe.
//!
//! Loads the scheduler configuration, the candidate catalog and the
//! precomputed horizontal tracks, scores every candidate at the requested
//! instant and prints the selection as JSON (`null` when nothing is
//! observable).
//!
//! # Usage
//!
//! ```bash
//! select-target --config scheduler.toml
//! select-target --catalog targets.yaml --tracks tracks.yaml --at 2024-03-01T22:00:00Z --explain
//! select-target --config scheduler.toml --weight observability=2.0
//! ```
//!
//! # Environment Variables
//!
//! - `SCHEDULER_CONFIG`: configuration file path
//! - `RUST_LOG`: log filter (default: info)

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use merit_scheduler::config::EphemerisSettings;
use merit_scheduler::observatory::Clock;
use merit_scheduler::scheduler::{Evaluation, Weights};
use merit_scheduler::SchedulerConfig;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "select-target")]
#[command(about = "Select the highest-merit observable target")]
#[command(version)]
struct Args {
    /// Configuration file path.
    #[arg(short, long, env = "SCHEDULER_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog file, overriding the configured one.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Horizontal track file, overriding the configured one.
    #[arg(long)]
    tracks: Option<PathBuf>,

    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,

    /// Merit weight as `name=value`. Replaces the configured weights when given.
    #[arg(short, long = "weight", value_parser = parse_weight)]
    weights: Vec<(String, f64)>,

    /// Print the per-target evaluation table to stderr.
    #[arg(long)]
    explain: bool,

    /// Log level.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let mut config = load_config(&args)?;
    if let Some(catalog) = &args.catalog {
        config.catalog.path = catalog.clone();
    }
    if let Some(tracks) = &args.tracks {
        config.ephemeris = Some(EphemerisSettings {
            tracks: tracks.clone(),
        });
    }

    let weights = if args.weights.is_empty() {
        config.scheduling_weights()
    } else {
        args.weights.iter().cloned().collect::<Weights>()
    };

    let clock = evaluation_clock(args.at);
    let station = config
        .station(clock)
        .context("Failed to build observatory from configuration")?;

    let scheduler = config.build_scheduler();
    let report = scheduler
        .reload()
        .with_context(|| format!("Failed to load catalog {}", config.catalog.path.display()))?;
    tracing::info!(
        "Catalog {}: {} of {} records loaded",
        report.source,
        report.loaded,
        report.total_records
    );
    for rejected in &report.rejected {
        tracing::warn!("Record {} rejected: {}", rejected.index, rejected.reason);
    }

    tracing::info!("Scheduling with weights {}", weights);

    if args.explain {
        let evaluations = scheduler
            .evaluate(&station, &weights)
            .context("Failed to evaluate candidates")?;
        print_explanation(&evaluations);
    }

    let selection = scheduler
        .get_target(&station, &weights)
        .context("Failed to select target")?;

    println!("{}", serde_json::to_string_pretty(&selection)?);
    Ok(())
}

/// One instant for the whole run, so `--explain` and the selection agree.
fn evaluation_clock(at: Option<DateTime<Utc>>) -> Clock {
    Clock::Fixed(at.unwrap_or_else(Utc::now))
}

fn load_config(args: &Args) -> Result<SchedulerConfig> {
    if let Some(path) = &args.config {
        return SchedulerConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()));
    }

    match (SchedulerConfig::from_default_location(), &args.catalog) {
        (Ok(config), _) => Ok(config),
        (Err(_), Some(catalog)) => Ok(SchedulerConfig::for_catalog(catalog)),
        (Err(e), None) => Err(anyhow::Error::new(e)
            .context("No configuration found; pass --config or --catalog")),
    }
}

/// Initialize tracing/logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_explanation(evaluations: &[Evaluation]) {
    eprintln!("{:<24} {:>9} {:>12} {:>12}  terms", "target", "priority", "merit", "score");
    for evaluation in evaluations {
        let score = match evaluation.score {
            Some(score) => format!("{:.3}", score),
            None => "veto".to_string(),
        };
        let terms: Vec<String> = evaluation
            .terms
            .iter()
            .map(|term| match term.merit.score() {
                Some(value) => format!("{}={}x{}", term.name, term.weight, value),
                None => format!("{}=veto", term.name),
            })
            .collect();
        eprintln!(
            "{:<24} {:>9.2} {:>12.3} {:>12}  {}",
            evaluation.name,
            evaluation.priority,
            evaluation.merit,
            score,
            terms.join(" ")
        );
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("'{}' is not an RFC 3339 timestamp", value))?;
    Ok(parsed.with_timezone(&Utc))
}

fn parse_weight(value: &str) -> Result<(String, f64)> {
    let Some((name, weight)) = value.split_once('=') else {
        bail!("expected name=value, got '{}'", value);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("weight name must not be empty");
    }
    let weight: f64 = weight
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a number", weight))?;
    Ok((name.to_string(), weight))
}
