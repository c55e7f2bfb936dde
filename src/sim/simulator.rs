//! The 30-step forward price simulation.
//!
//! State carried between steps: the current simulated price, a trailing
//! window of the last 30 prices (historical, then simulated) for a live MA30,
//! and the seeded stream. Per step, with `p` the current price:
//!
//! ```text
//! trend     = slope14 · TREND_DAMPING
//! momentum  = momentum · MOMENTUM_SCALE · p
//! reversion = (MA30 - p) · REVERSION_RATE
//! seasonal  = seasonal[weekday(target)] · p
//! supply    = supply_pressure · p
//! noise     = N(0, volatility) · p
//! next      = clamp(p + Σ, p0 · (1 ± CLAMP_BAND))
//! ```
//!
//! `momentum`, `seasonal`, `supply` and the noise term are fractional signals,
//! so they are scaled by `p` to become price moves. `trend` and `reversion` are
//! already in price units.
//!
//! Draw order per step is fixed: two uniforms for the noise, then one for the
//! confidence jitter.

use std::collections::VecDeque;

use chrono::{Datelike, Duration};

use crate::domain::{DailyForecast, Features, HORIZON_DAYS, Recommendation, RiskLabel, round_to};
use crate::math::mean;
use crate::sim::rng::SeededStream;

pub const TREND_DAMPING: f64 = 0.5;
pub const MOMENTUM_SCALE: f64 = 0.15;
pub const REVERSION_RATE: f64 = 0.1;
/// Simulated prices stay within ±15% of the last observed price.
pub const CLAMP_BAND: f64 = 0.15;

/// Daily move (percent) beyond which a day is high risk.
pub const HIGH_RISK_MOVE_PCT: f64 = 2.0;
/// Trailing volatility beyond which every day is high risk.
pub const HIGH_RISK_VOLATILITY: f64 = 0.03;

pub const STRONG_BUY_BELOW_PCT: f64 = -1.5;
pub const BUY_BELOW_PCT: f64 = -0.5;

pub const CONFIDENCE_MIN: f64 = 40.0;
pub const CONFIDENCE_MAX: f64 = 95.0;
const CONFIDENCE_BASE: f64 = 92.0;
const CONFIDENCE_DECAY_PER_DAY: f64 = 1.2;
const VOLATILITY_PENALTY_SCALE: f64 = 400.0;
const VOLATILITY_PENALTY_CAP: f64 = 25.0;
const CONFIDENCE_JITTER: f64 = 2.0;

const MA_WINDOW: usize = 30;

/// Run the forward simulation. Always returns exactly `HORIZON_DAYS` days.
pub fn project(features: &Features, stream: &mut SeededStream) -> Vec<DailyForecast> {
    let p0 = features.last_price;
    let floor = p0 * (1.0 - CLAMP_BAND);
    let ceiling = p0 * (1.0 + CLAMP_BAND);

    let mut window: VecDeque<f64> = features.trailing.iter().copied().collect();
    while window.len() > MA_WINDOW {
        window.pop_front();
    }

    let mut current = p0;
    let mut days = Vec::with_capacity(HORIZON_DAYS);

    for i in 0..HORIZON_DAYS {
        let date = features.last_date + Duration::days(i as i64 + 1);
        let ma30 = if window.is_empty() {
            current
        } else {
            mean(window.make_contiguous())
        };
        let weekday = date.weekday().num_days_from_monday() as usize;

        let trend = features.slope14 * TREND_DAMPING;
        let momentum = features.momentum * MOMENTUM_SCALE * current;
        let reversion = (ma30 - current) * REVERSION_RATE;
        let seasonal = features.seasonal[weekday] * current;
        let supply = features.supply_pressure * current;
        let noise = stream.gaussian(0.0, features.volatility) * current;

        let next = (current + trend + momentum + reversion + seasonal + supply + noise).clamp(floor, ceiling);

        let change_pct = pct_change(current, next);
        let cumulative_pct = pct_change(p0, next);
        let risk = classify_risk(change_pct, features.volatility);
        let recommendation = classify_recommendation(change_pct, risk);
        let confidence = confidence(i, features.volatility, stream.jitter(CONFIDENCE_JITTER));

        days.push(DailyForecast {
            date,
            day: i + 1,
            price: next,
            prices: None,
            display_date: None,
            change_pct,
            cumulative_pct,
            risk,
            recommendation,
            confidence,
        });

        window.push_back(next);
        if window.len() > MA_WINDOW {
            window.pop_front();
        }
        current = next;
    }

    days
}

fn pct_change(from: f64, to: f64) -> f64 {
    if from.abs() > f64::EPSILON {
        (to - from) / from * 100.0
    } else {
        0.0
    }
}

pub fn classify_risk(change_pct: f64, volatility: f64) -> RiskLabel {
    if change_pct.abs() > HIGH_RISK_MOVE_PCT || volatility > HIGH_RISK_VOLATILITY {
        RiskLabel::High
    } else {
        RiskLabel::Normal
    }
}

/// First matching rule wins: STRONG BUY, BUY, ACCUMULATE, WAIT.
pub fn classify_recommendation(change_pct: f64, risk: RiskLabel) -> Recommendation {
    let normal = risk == RiskLabel::Normal;
    if change_pct < STRONG_BUY_BELOW_PCT && normal {
        Recommendation::StrongBuy
    } else if change_pct < BUY_BELOW_PCT && normal {
        Recommendation::Buy
    } else if change_pct < 0.0 {
        Recommendation::Accumulate
    } else {
        Recommendation::Wait
    }
}

/// Confidence for horizon index `i` (0-based), clamped to `[40, 95]`.
pub fn confidence(i: usize, volatility: f64, jitter: f64) -> f64 {
    let base = CONFIDENCE_BASE - CONFIDENCE_DECAY_PER_DAY * i as f64;
    let penalty = (volatility * VOLATILITY_PENALTY_SCALE).min(VOLATILITY_PENALTY_CAP);
    round_to((base - penalty + jitter).clamp(CONFIDENCE_MIN, CONFIDENCE_MAX), 1)
}
