//! Shared "resolve a forecast" logic used by every front-end command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fingerprint -> cache lookup -> parse -> simulate -> cache write -> backfill
//!
//! Commands can then focus on presentation (printing, exports, batching).

use tracing::info;

use crate::cache::{CacheKey, ForecastCache, KeyValueStore, range_token};
use crate::domain::{CacheKeyMode, ForecastConfig, ForecastResult, ForecastSource, PriceSeries, Record};
use crate::error::ForecastError;
use crate::fingerprint::fingerprint;
use crate::progress::ProgressSink;
use crate::report;
use crate::sim;

/// A forecast plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub result: ForecastResult,
    pub source: ForecastSource,
    pub key: CacheKey,
}

/// Return the cached forecast for `rows` or compute, store and return a new one.
///
/// With `config.use_cache == false` the cache is neither read nor written.
/// Derived display fields are backfilled in both cases.
pub fn resolve_forecast<S: KeyValueStore>(
    rows: &[Record],
    cache: &mut ForecastCache<S>,
    config: &ForecastConfig,
    progress: &mut dyn ProgressSink,
) -> Result<Resolved, ForecastError> {
    let fp = fingerprint(rows)?;
    progress.report(5, "fingerprint computed");

    // Range keys need the parsed series; content keys do not.
    let mut series: Option<PriceSeries> = None;
    let key = match cache.mode() {
        CacheKeyMode::Content => CacheKey::Content(fp, config.best_entry),
        CacheKeyMode::Range => {
            let parsed = PriceSeries::from_records(rows)?;
            let token = range_token(&parsed).ok_or(ForecastError::EmptySeries)?;
            series = Some(parsed);
            CacheKey::DateRange(token, config.best_entry)
        }
    };

    if config.use_cache {
        if let Some(mut result) = cache.lookup(&key) {
            progress.report(10, "cache checked");
            report::backfill(&mut result, &config.rates);
            progress.report(100, "complete");
            return Ok(Resolved {
                result,
                source: ForecastSource::Cached,
                key,
            });
        }
    }
    progress.report(10, "cache checked");

    let series = match series {
        Some(s) => s,
        None => PriceSeries::from_records(rows)?,
    };
    progress.report(15, "trend window ready");

    let mut result = sim::simulate_with_progress(&series, &fp, config.best_entry, progress)?;

    if config.use_cache && !cache.store(&key, &result) {
        info!(%key, "forecast not stored (entry exists or store unavailable)");
    }

    report::backfill(&mut result, &config.rates);
    progress.report(100, "complete");

    Ok(Resolved {
        result,
        source: ForecastSource::Fresh,
        key,
    })
}
