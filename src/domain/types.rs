//! Shared domain types.
//!
//! Result types are serializable so they can be:
//!
//! - stored verbatim in the forecast cache
//! - exported to JSON/CSV
//! - reloaded later and compared byte-for-byte

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of simulated days in every forecast.
pub const HORIZON_DAYS: usize = 30;

/// Day risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Normal")]
    Normal,
}

impl RiskLabel {
    pub fn display_name(self) -> &'static str {
        match self {
            RiskLabel::High => "High Risk",
            RiskLabel::Normal => "Normal",
        }
    }
}

/// Procurement recommendation for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "ACCUMULATE")]
    Accumulate,
    #[serde(rename = "WAIT")]
    Wait,
}

impl Recommendation {
    pub const ALL: [Recommendation; 4] = [
        Recommendation::StrongBuy,
        Recommendation::Buy,
        Recommendation::Accumulate,
        Recommendation::Wait,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Accumulate => "ACCUMULATE",
            Recommendation::Wait => "WAIT",
        }
    }
}

/// How the reported best entry is chosen.
///
/// Exactly one strategy is active per configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BestEntryStrategy {
    /// Calendar day derived from the dataset digest (month after the last observation).
    HashedDay,
    /// Lowest simulated price in the window (earliest day on ties).
    MinPrice,
}

impl BestEntryStrategy {
    /// Kebab-case name, as accepted by `--best-entry`.
    pub fn slug(self) -> &'static str {
        match self {
            BestEntryStrategy::HashedDay => "hashed-day",
            BestEntryStrategy::MinPrice => "min-price",
        }
    }
}

/// What the forecast cache is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CacheKeyMode {
    /// Content fingerprint of the uploaded rows.
    Content,
    /// Detected date range token (e.g. `feb-mar-2026`).
    Range,
}

/// Whether a resolved forecast was computed now or loaded from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastSource {
    Fresh,
    Cached,
}

impl ForecastSource {
    pub fn display_name(self) -> &'static str {
        match self {
            ForecastSource::Fresh => "fresh",
            ForecastSource::Cached => "cached",
        }
    }
}

/// Exchange rates used to backfill currency conversions (INR base).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRates {
    pub inr_per_usd: f64,
    pub sar_per_usd: f64,
}

impl Default for CurrencyRates {
    fn default() -> Self {
        Self {
            inr_per_usd: 83.5,
            sar_per_usd: 3.75,
        }
    }
}

impl CurrencyRates {
    pub fn convert(&self, price_inr: f64) -> CurrencyPrices {
        let usd = if self.inr_per_usd > 0.0 {
            price_inr / self.inr_per_usd
        } else {
            0.0
        };
        CurrencyPrices {
            inr: price_inr,
            usd: round_to(usd, 4),
            sar: round_to(usd * self.sar_per_usd, 4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPrices {
    pub inr: f64,
    pub usd: f64,
    pub sar: f64,
}

/// One simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// 1-based horizon (day 1 is the day after the last observation).
    pub day: usize,
    pub price: f64,
    /// Backfilled after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<CurrencyPrices>,
    /// Backfilled after creation (`DD-MM-YYYY`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_date: Option<String>,
    pub change_pct: f64,
    pub cumulative_pct: f64,
    pub risk: RiskLabel,
    pub recommendation: Recommendation,
    pub confidence: f64,
}

/// The single recommended procurement date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestEntry {
    pub date: NaiveDate,
    pub price: f64,
    pub confidence: f64,
    pub strategy: BestEntryStrategy,
    /// 1-based forecast day, when the date falls inside the window.
    pub day: Option<usize>,
    pub recommendation: Option<Recommendation>,
    pub risk: Option<RiskLabel>,
    /// Built from window averages because the date is outside the window.
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastWindow {
    pub last_observed: NaiveDate,
    pub last_price: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationCounts {
    pub strong_buy: usize,
    pub buy: usize,
    pub accumulate: usize,
    pub wait: usize,
}

impl RecommendationCounts {
    pub fn get(&self, r: Recommendation) -> usize {
        match r {
            Recommendation::StrongBuy => self.strong_buy,
            Recommendation::Buy => self.buy,
            Recommendation::Accumulate => self.accumulate,
            Recommendation::Wait => self.wait,
        }
    }

    pub fn total(&self) -> usize {
        self.strong_buy + self.buy + self.accumulate + self.wait
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub high: usize,
    pub normal: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastStats {
    pub recommendations: RecommendationCounts,
    pub risk: RiskCounts,
    pub min_price: f64,
    pub max_price: f64,
    pub mean_price: f64,
    pub mean_confidence: f64,
}

/// Signals extracted from the trailing history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub sma7: f64,
    pub sma14: f64,
    pub sma30: f64,
    pub ema7: f64,
    pub ema14: f64,
    pub slope14: f64,
    pub momentum: f64,
    pub volatility: f64,
    /// Mean day-over-day return per weekday, Monday first.
    pub seasonal: [f64; 7],
    pub supply_pressure: f64,
    pub last_price: f64,
    pub last_date: NaiveDate,
    /// Last (up to) 30 observed prices, oldest first.
    pub trailing: Vec<f64>,
}

/// Everything produced for one unique input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub fingerprint: String,
    pub seed: u64,
    pub window: ForecastWindow,
    pub days: Vec<DailyForecast>,
    pub best_entry: BestEntry,
    pub stats: ForecastStats,
    pub narrative: Vec<String>,
    pub features: Features,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub csv_path: PathBuf,
    /// `None` keeps the cache in memory for this process only.
    pub cache_dir: Option<PathBuf>,
    pub use_cache: bool,
    pub cache_key: CacheKeyMode,
    pub best_entry: BestEntryStrategy,
    pub rates: CurrencyRates,
    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::new(),
            cache_dir: None,
            use_cache: true,
            cache_key: CacheKeyMode::Content,
            best_entry: BestEntryStrategy::HashedDay,
            rates: CurrencyRates::default(),
            export_json: None,
            export_csv: None,
        }
    }
}

pub(crate) fn round_to(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}
