//! Signal extraction from the trailing price history.
//!
//! Everything here is a pure function of the `PriceSeries`; no randomness.
//!
//! Windows (in observations, not calendar days):
//! - SMA over 7/14/30, EMA spans 7/14 over the trailing-30 window
//! - OLS slope over the trailing 14
//! - volatility over the returns of the trailing 30
//! - weekday seasonality over the full history
//! - supply pressure from the trailing-7 arrivals

use chrono::Datelike;
use tracing::debug;

use crate::domain::{Features, PriceSeries};
use crate::error::ForecastError;
use crate::math::{ema, linear_slope, mean, pct_returns, sma, std_dev, tail};

/// Minimum number of usable observations.
pub const MIN_HISTORY: usize = 30;

/// A weekday effect is only trusted with at least this many transitions.
pub const SEASONAL_MIN_TRANSITIONS: usize = 6;

/// Typical daily arrivals (kg); supply above it pushes price down.
pub const REFERENCE_QTY: f64 = 13_000.0;
const SUPPLY_SENSITIVITY: f64 = 0.002;
const SUPPLY_LIMIT: f64 = 0.004;

/// Compute all simulator inputs from the series.
pub fn extract(series: &PriceSeries) -> Result<Features, ForecastError> {
    let found = series.len();
    if found < MIN_HISTORY {
        return Err(ForecastError::InsufficientHistory {
            required: MIN_HISTORY,
            found,
        });
    }
    let last = series.last().ok_or(ForecastError::EmptySeries)?;

    let prices = series.prices();
    let window30 = tail(&prices, 30);

    let ema7 = ema(window30, 7);
    let ema14 = ema(window30, 14);
    let momentum = if ema14.abs() > f64::EPSILON {
        (ema7 - ema14) / ema14
    } else {
        0.0
    };

    let features = Features {
        sma7: sma(&prices, 7),
        sma14: sma(&prices, 14),
        sma30: sma(&prices, 30),
        ema7,
        ema14,
        slope14: linear_slope(tail(&prices, 14)),
        momentum,
        volatility: std_dev(&pct_returns(window30)),
        seasonal: weekday_effects(series),
        supply_pressure: supply_pressure(series),
        last_price: last.price,
        last_date: last.date,
        trailing: window30.to_vec(),
    };

    debug!(
        slope14 = features.slope14,
        momentum = features.momentum,
        volatility = features.volatility,
        supply = features.supply_pressure,
        "features extracted"
    );
    Ok(features)
}

/// Mean return of transitions landing on each weekday (Monday first).
pub fn weekday_effects(series: &PriceSeries) -> [f64; 7] {
    let mut buckets: [Vec<f64>; 7] = Default::default();
    for pair in series.observations().windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if prev.price <= 0.0 {
            continue;
        }
        let wd = cur.date.weekday().num_days_from_monday() as usize;
        buckets[wd].push((cur.price - prev.price) / prev.price);
    }

    let mut out = [0.0; 7];
    for (slot, bucket) in out.iter_mut().zip(buckets.iter()) {
        if bucket.len() >= SEASONAL_MIN_TRANSITIONS {
            *slot = mean(bucket);
        }
    }
    out
}

/// Relative price pressure from recent arrivals; negative when supply is high.
pub fn supply_pressure(series: &PriceSeries) -> f64 {
    let obs = series.observations();
    let recent = &obs[obs.len().saturating_sub(7)..];
    let qty: Vec<f64> = recent.iter().filter_map(|o| o.qty_arrived).collect();
    if qty.is_empty() {
        return 0.0;
    }
    let ratio = mean(&qty) / REFERENCE_QTY;
    (-SUPPLY_SENSITIVITY * (ratio - 1.0)).clamp(-SUPPLY_LIMIT, SUPPLY_LIMIT)
}
