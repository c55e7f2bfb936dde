//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` defaults and installs logging
//! - parses CLI arguments
//! - resolves forecasts through the cache-aware pipeline
//! - prints reports and writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;
use rayon::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cache::{FileStore, ForecastCache, KeyValueStore, MemoryStore};
use crate::cli::{BatchArgs, CacheCommand, Command, CsvArgs, ForecastArgs, ImportArgs, RunArgs, SampleArgs};
use crate::domain::{CacheKeyMode, CurrencyRates, ForecastConfig, PriceSeries};
use crate::error::AppError;
use crate::progress::NoProgress;
use crate::report::{BatchLine, BatchSummary};

pub mod pipeline;

/// Entry point for the `pf` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Fingerprint(args) => handle_fingerprint(args),
        Command::BestDay(args) => handle_best_day(args),
        Command::Sample(args) => handle_sample(args),
        Command::Batch(args) => handle_batch(args),
        Command::Cache(CacheCommand::Import(args)) => handle_import(args),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args.forecast, Some(&args));
    let dataset = crate::io::load_dataset(&config.csv_path)?;
    if !dataset.row_errors.is_empty() {
        eprintln!(
            "Skipped {} of {} CSV rows (run with -v for details).",
            dataset.row_errors.len(),
            dataset.rows_read
        );
    }

    let mut cache = open_cache(&config)?;
    let resolved = pipeline::resolve_forecast(&dataset.rows, &mut cache, &config, &mut NoProgress)?;

    println!(
        "{}",
        crate::report::format_run_summary(&resolved.result, resolved.source)
    );
    if !args.no_table {
        println!("{}", crate::report::format_days(&resolved.result.days));
    }

    if let Some(path) = &config.export_json {
        crate::io::write_result_json(path, &resolved.result)?;
        info!(path = %path.display(), "wrote forecast JSON");
    }
    if let Some(path) = &config.export_csv {
        crate::io::write_forecast_csv(path, &resolved.result)?;
        info!(path = %path.display(), "wrote forecast CSV");
    }

    Ok(())
}

fn handle_fingerprint(args: CsvArgs) -> Result<(), AppError> {
    let dataset = crate::io::load_dataset(&args.csv)?;
    let fp = crate::fingerprint::fingerprint(&dataset.rows)?;
    println!("Fingerprint: {fp}");
    println!("Seed: {}", crate::fingerprint::simulation_seed(&fp));
    println!("Rows: {}", dataset.rows.len());
    Ok(())
}

fn handle_best_day(args: CsvArgs) -> Result<(), AppError> {
    let dataset = crate::io::load_dataset(&args.csv)?;
    let series = PriceSeries::from_records(&dataset.rows)?;
    let selection = crate::fingerprint::select_deterministic_day(&series)?;
    println!("{}", crate::report::format_day_selection(&selection));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let rows = crate::data::generate_scenario(args.scenario, args.days, args.seed)?;
    crate::io::write_dataset_csv(&args.out, &rows)?;

    println!(
        "{}: {} rows -> {}",
        args.scenario.display_name(),
        rows.len(),
        args.out.display()
    );
    if let Some((first, last, change)) = crate::data::price_change(&rows) {
        println!("Price: INR {first:.1} -> {last:.1} ({change:+.1}%)");
    }
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let files = csv_files_in(&args.dir)?;
    if files.is_empty() {
        return Err(AppError::new(
            3,
            format!("No CSV files found in '{}'.", args.dir.display()),
        ));
    }
    let config = forecast_config_from_args(&args.forecast, None);

    // Each worker owns its cache handle; a shared FileStore directory keeps
    // write-once semantics through no-clobber persists.
    let lines: Vec<BatchLine> = files
        .par_iter()
        .map(|path| BatchLine {
            file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            outcome: batch_one(path, &config).map_err(|e| e.to_string()),
        })
        .collect();

    println!("{}", crate::report::format_batch(&lines));

    let failed = lines.iter().filter(|l| l.outcome.is_err()).count();
    if failed > 0 {
        return Err(AppError::new(
            4,
            format!("{failed} of {} files failed.", lines.len()),
        ));
    }
    Ok(())
}

fn batch_one(path: &Path, config: &ForecastConfig) -> Result<BatchSummary, AppError> {
    let dataset = crate::io::load_dataset(path)?;
    let mut cache = open_cache(config)?;
    let resolved = pipeline::resolve_forecast(&dataset.rows, &mut cache, config, &mut NoProgress)?;
    let r = &resolved.result;
    Ok(BatchSummary {
        fingerprint: r.fingerprint.clone(),
        source: resolved.source,
        best_date: r.best_entry.date.format("%d-%m-%Y").to_string(),
        best_price: r.best_entry.price,
        final_price: r.days.last().map(|d| d.price).unwrap_or(r.window.last_price),
    })
}

fn handle_import(args: ImportArgs) -> Result<(), AppError> {
    let token = crate::cache::normalize_range_token(&args.range).ok_or_else(|| {
        AppError::new(
            2,
            format!("Invalid range token '{}': use letters, digits and '-'.", args.range),
        )
    })?;
    let result = crate::io::read_result_json(&args.result)?;
    let store = FileStore::open(&args.cache_dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open cache dir '{}': {e}", args.cache_dir.display()),
        )
    })?;
    let mut cache = ForecastCache::new(store, CacheKeyMode::Range);

    let strategy = result.best_entry.strategy.slug();
    if cache.import(&token, &result) {
        println!("Imported {strategy} forecast as range '{token}'.");
    } else {
        warn!(range = %token, strategy, "import skipped");
        println!("Entry for range '{token}' ({strategy}) already exists or could not be written; left unchanged.");
    }
    Ok(())
}

/// Derive the pipeline configuration from CLI flags (and env defaults).
pub fn forecast_config_from_args(args: &ForecastArgs, run: Option<&RunArgs>) -> ForecastConfig {
    ForecastConfig {
        csv_path: run.map(|r| r.csv.clone()).unwrap_or_default(),
        cache_dir: args.cache_dir.clone(),
        use_cache: !args.no_cache,
        cache_key: args.cache_key,
        best_entry: args.best_entry,
        rates: CurrencyRates {
            inr_per_usd: args.inr_per_usd,
            sar_per_usd: args.sar_per_usd,
        },
        export_json: run.and_then(|r| r.export_json.clone()),
        export_csv: run.and_then(|r| r.export_csv.clone()),
    }
}

/// Persistent cache when a directory is configured, process-local otherwise.
pub fn open_cache(config: &ForecastConfig) -> Result<ForecastCache<Box<dyn KeyValueStore>>, AppError> {
    let store: Box<dyn KeyValueStore> = match &config.cache_dir {
        Some(dir) => Box::new(FileStore::open(dir).map_err(|e| {
            AppError::new(2, format!("Failed to open cache dir '{}': {e}", dir.display()))
        })?),
        None => Box::new(MemoryStore::new()),
    };
    Ok(ForecastCache::new(store, config.cache_key))
}

fn csv_files_in(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to read directory '{}': {e}", dir.display())))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_follows_flags() {
        let cli = crate::cli::Cli::try_parse_from([
            "pf",
            "run",
            "--csv",
            "in.csv",
            "--no-cache",
            "--inr-per-usd",
            "80",
            "--export-json",
            "out.json",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = forecast_config_from_args(&args.forecast, Some(&args));
        assert!(!config.use_cache);
        assert_eq!(config.csv_path, PathBuf::from("in.csv"));
        assert_eq!(config.rates.inr_per_usd, 80.0);
        assert_eq!(config.export_json, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn batch_lists_only_csv_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.CSV", "notes.txt"] {
            std::fs::write(dir.path().join(name), "time\n").unwrap();
        }
        let files = csv_files_in(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }
}
