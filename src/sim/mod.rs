//! Forward simulation: seeded stream + 30-step projection.

pub mod rng;
pub mod simulator;

pub use rng::SeededStream;
pub use simulator::project;

use tracing::debug;

use crate::best::select_best_entry;
use crate::domain::{BestEntryStrategy, ForecastResult, PriceSeries};
use crate::error::ForecastError;
use crate::features;
use crate::fingerprint::{Fingerprint, simulation_seed};
use crate::progress::{NoProgress, ProgressSink};
use crate::report;

/// Compute a complete forecast for `series`, seeded from `fp`.
///
/// Pure: identical inputs produce identical results. Derived display fields
/// are not filled here; see [`report::backfill`].
pub fn simulate(
    series: &PriceSeries,
    fp: &Fingerprint,
    strategy: BestEntryStrategy,
) -> Result<ForecastResult, ForecastError> {
    simulate_with_progress(series, fp, strategy, &mut NoProgress)
}

/// [`simulate`], reporting milestones 35 through 95.
pub fn simulate_with_progress(
    series: &PriceSeries,
    fp: &Fingerprint,
    strategy: BestEntryStrategy,
    progress: &mut dyn ProgressSink,
) -> Result<ForecastResult, ForecastError> {
    let features = features::extract(series)?;
    progress.report(35, "signals extracted");

    let seed = simulation_seed(fp);
    let mut stream = SeededStream::new(seed);
    progress.report(55, "simulation starting");
    let days = project(&features, &mut stream);
    debug!(seed, draws = stream.draws(), "simulation finished");
    progress.report(90, "simulation done");

    let best = select_best_entry(&days, series, strategy)?;
    progress.report(95, "best entry selected");

    Ok(report::assemble(fp, seed, features, days, best))
}
