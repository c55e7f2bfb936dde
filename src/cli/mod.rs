//! Command-line parsing for the `pf` price forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! simulation and caching code. Defaults that vary per deployment can come
//! from the environment (or a `.env` file loaded at startup).

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::data::Scenario;
use crate::domain::{BestEntryStrategy, CacheKeyMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pf", version, about = "Deterministic 30-day price forecaster")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast the next 30 days for a market-history CSV (cache-aware).
    Run(RunArgs),
    /// Print the content fingerprint and simulation seed of a CSV.
    Fingerprint(CsvArgs),
    /// Print the deterministic best purchase day and how it was derived.
    BestDay(CsvArgs),
    /// Write a synthetic scenario dataset.
    Sample(SampleArgs),
    /// Forecast every CSV in a directory in parallel.
    Batch(BatchArgs),
    /// Manage cache entries.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Args, Clone)]
pub struct CsvArgs {
    /// Market-history CSV.
    #[arg(long)]
    pub csv: PathBuf,
}

/// Options shared by every command that resolves forecasts.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Directory for the persistent cache. Without it the cache lives in memory.
    #[arg(long, env = "PF_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Always simulate; neither read nor write the cache.
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,

    /// What cache entries are keyed by.
    #[arg(long, value_enum, env = "PF_CACHE_KEY", default_value_t = CacheKeyMode::Content)]
    pub cache_key: CacheKeyMode,

    /// How the reported best entry is chosen.
    #[arg(long, value_enum, env = "PF_BEST_ENTRY", default_value_t = BestEntryStrategy::HashedDay)]
    pub best_entry: BestEntryStrategy,

    /// INR per USD for derived currency columns.
    #[arg(long, env = "PF_INR_PER_USD", default_value_t = 83.5)]
    pub inr_per_usd: f64,

    /// SAR per USD for derived currency columns.
    #[arg(long, env = "PF_SAR_PER_USD", default_value_t = 3.75)]
    pub sar_per_usd: f64,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Market-history CSV.
    #[arg(long)]
    pub csv: PathBuf,

    #[command(flatten)]
    pub forecast: ForecastArgs,

    /// Hide the per-day table.
    #[arg(long, default_value_t = false)]
    pub no_table: bool,

    /// Write the full result as JSON.
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Write the per-day forecast as CSV.
    #[arg(long)]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    #[arg(long, value_enum)]
    pub scenario: Scenario,

    /// Output CSV path.
    #[arg(long)]
    pub out: PathBuf,

    /// Random seed for the generator.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of daily rows.
    #[arg(long, default_value_t = 30)]
    pub days: usize,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Directory containing `*.csv` files.
    #[arg(long)]
    pub dir: PathBuf,

    #[command(flatten)]
    pub forecast: ForecastArgs,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Pre-author a date-range entry from an exported forecast JSON.
    Import(ImportArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ImportArgs {
    /// Range token, e.g. `feb-mar-2026`.
    #[arg(long)]
    pub range: String,

    /// Forecast JSON written by `pf run --export-json`.
    #[arg(long)]
    pub result: PathBuf,

    #[arg(long, env = "PF_CACHE_DIR")]
    pub cache_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "pf",
            "-vv",
            "run",
            "--csv",
            "in.csv",
            "--no-cache",
            "--cache-key",
            "range",
            "--best-entry",
            "min-price",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.forecast.no_cache);
        assert_eq!(args.forecast.cache_key, CacheKeyMode::Range);
        assert_eq!(args.forecast.best_entry, BestEntryStrategy::MinPrice);
    }

    #[test]
    fn sample_scenario_names_are_kebab_case() {
        let cli = Cli::try_parse_from([
            "pf", "sample", "--scenario", "bubble-crash", "--out", "x.csv",
        ])
        .unwrap();
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(args.scenario, Scenario::BubbleCrash);
        assert_eq!(args.days, 30);
    }
}
