//! Result assembly: summary statistics, narrative, derived-field backfill.
//!
//! Terminal formatting lives in `format` so output changes stay localized.

use crate::domain::{
    BestEntry, CurrencyRates, DailyForecast, Features, ForecastResult, ForecastStats, ForecastWindow,
    Recommendation, RecommendationCounts, RiskCounts, RiskLabel, round_to,
};
use crate::fingerprint::Fingerprint;
use crate::math::mean;

pub mod format;

pub use format::*;

/// Build the immutable result for one simulation run.
pub fn assemble(
    fp: &Fingerprint,
    seed: u64,
    features: Features,
    days: Vec<DailyForecast>,
    best_entry: BestEntry,
) -> ForecastResult {
    let window = ForecastWindow {
        last_observed: features.last_date,
        last_price: features.last_price,
        start: days.first().map(|d| d.date).unwrap_or(features.last_date),
        end: days.last().map(|d| d.date).unwrap_or(features.last_date),
        days: days.len(),
    };
    let stats = summarize(&days);
    let narrative = narrative(&window, &days, &stats, &best_entry);

    ForecastResult {
        fingerprint: fp.to_hex(),
        seed,
        window,
        days,
        best_entry,
        stats,
        narrative,
        features,
    }
}

/// Counts per bucket plus price and confidence aggregates.
pub fn summarize(days: &[DailyForecast]) -> ForecastStats {
    let mut recommendations = RecommendationCounts::default();
    let mut risk = RiskCounts::default();
    for d in days {
        match d.recommendation {
            Recommendation::StrongBuy => recommendations.strong_buy += 1,
            Recommendation::Buy => recommendations.buy += 1,
            Recommendation::Accumulate => recommendations.accumulate += 1,
            Recommendation::Wait => recommendations.wait += 1,
        }
        match d.risk {
            RiskLabel::High => risk.high += 1,
            RiskLabel::Normal => risk.normal += 1,
        }
    }

    let prices: Vec<f64> = days.iter().map(|d| d.price).collect();
    let confidences: Vec<f64> = days.iter().map(|d| d.confidence).collect();
    let (min_price, max_price) = if prices.is_empty() {
        (0.0, 0.0)
    } else {
        prices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)))
    };

    ForecastStats {
        recommendations,
        risk,
        min_price,
        max_price,
        mean_price: mean(&prices),
        mean_confidence: round_to(mean(&confidences), 1),
    }
}

/// Short statements derived from the other result fields.
pub fn narrative(
    window: &ForecastWindow,
    days: &[DailyForecast],
    stats: &ForecastStats,
    best: &BestEntry,
) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(last) = days.last() {
        let direction = if last.cumulative_pct > 0.5 {
            "rise"
        } else if last.cumulative_pct < -0.5 {
            "fall"
        } else {
            "hold steady"
        };
        out.push(format!(
            "Prices are projected to {direction} ({:+.2}%) from INR {:.2} to INR {:.2} by {}.",
            last.cumulative_pct,
            window.last_price,
            last.price,
            last.date.format("%d-%m-%Y"),
        ));
    }

    // Ties resolve in priority order.
    let mut dominant = Recommendation::Wait;
    let mut dominant_n = 0;
    for r in Recommendation::ALL {
        let n = stats.recommendations.get(r);
        if n > dominant_n {
            dominant = r;
            dominant_n = n;
        }
    }
    if dominant_n > 0 {
        out.push(format!(
            "Dominant signal: {} on {} of {} days.",
            dominant.display_name(),
            dominant_n,
            stats.recommendations.total()
        ));
    }

    if stats.risk.high == 0 {
        out.push("No high-risk days in the forecast window.".to_string());
    } else {
        out.push(format!("{} day(s) flagged High Risk.", stats.risk.high));
    }

    out.push(format!(
        "Expected price range: INR {:.2} to INR {:.2} (mean INR {:.2}).",
        stats.min_price, stats.max_price, stats.mean_price
    ));

    let mut entry = format!(
        "Best entry: {} at INR {:.2} (confidence {:.1}%).",
        best.date.format("%d-%m-%Y"),
        best.price,
        best.confidence
    );
    if best.synthetic {
        entry.push_str(" Date lies outside the simulated window; price is the window average.");
    }
    out.push(entry);

    out
}

/// Fill currency conversions and display dates that are still missing.
///
/// Returns the number of days that were touched.
pub fn backfill(result: &mut ForecastResult, rates: &CurrencyRates) -> usize {
    let mut touched = 0;
    for d in &mut result.days {
        let mut changed = false;
        if d.prices.is_none() {
            d.prices = Some(rates.convert(d.price));
            changed = true;
        }
        if d.display_date.is_none() {
            d.display_date = Some(d.date.format("%d-%m-%Y").to_string());
            changed = true;
        }
        if changed {
            touched += 1;
        }
    }
    touched
}
