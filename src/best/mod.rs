//! Best-entry selection over a simulated window.
//!
//! Two mutually exclusive strategies; the configuration picks one:
//!
//! - `HashedDay`: the content-derived calendar day from
//!   [`crate::fingerprint::select_deterministic_day`]. If that date falls in the
//!   window the matching day is reported; otherwise a synthetic entry carries
//!   the window's average price and confidence.
//! - `MinPrice`: the cheapest simulated day (earliest on ties).

use tracing::debug;

use crate::domain::{BestEntry, BestEntryStrategy, DailyForecast, PriceSeries, round_to};
use crate::error::ForecastError;
use crate::fingerprint::select_deterministic_day;
use crate::math::mean;

pub fn select_best_entry(
    days: &[DailyForecast],
    series: &PriceSeries,
    strategy: BestEntryStrategy,
) -> Result<BestEntry, ForecastError> {
    match strategy {
        BestEntryStrategy::HashedDay => {
            let selection = select_deterministic_day(series)?;
            debug!(date = %selection.date, prefix = %selection.prefix, "deterministic day selected");
            hashed_day_entry(days, selection.date)
        }
        BestEntryStrategy::MinPrice => min_price_entry(days),
    }
}

fn hashed_day_entry(days: &[DailyForecast], date: chrono::NaiveDate) -> Result<BestEntry, ForecastError> {
    if let Some(day) = days.iter().find(|d| d.date == date) {
        return Ok(from_day(day, BestEntryStrategy::HashedDay));
    }
    if days.is_empty() {
        return Err(ForecastError::EmptySeries);
    }

    let prices: Vec<f64> = days.iter().map(|d| d.price).collect();
    let confidences: Vec<f64> = days.iter().map(|d| d.confidence).collect();
    Ok(BestEntry {
        date,
        price: mean(&prices),
        confidence: round_to(mean(&confidences), 1),
        strategy: BestEntryStrategy::HashedDay,
        day: None,
        recommendation: None,
        risk: None,
        synthetic: true,
    })
}

fn min_price_entry(days: &[DailyForecast]) -> Result<BestEntry, ForecastError> {
    let mut best: Option<&DailyForecast> = None;
    for d in days {
        match best {
            Some(b) if d.price >= b.price => {}
            _ => best = Some(d),
        }
    }
    best.map(|d| from_day(d, BestEntryStrategy::MinPrice))
        .ok_or(ForecastError::EmptySeries)
}

fn from_day(day: &DailyForecast, strategy: BestEntryStrategy) -> BestEntry {
    BestEntry {
        date: day.date,
        price: day.price,
        confidence: day.confidence,
        strategy,
        day: Some(day.day),
        recommendation: Some(day.recommendation),
        risk: Some(day.risk),
        synthetic: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Recommendation, RiskLabel};
    use chrono::{Duration, NaiveDate};

    fn days(prices: &[f64]) -> Vec<DailyForecast> {
        let start = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| DailyForecast {
                date: start + Duration::days(i as i64),
                day: i + 1,
                price: p,
                prices: None,
                display_date: None,
                change_pct: 0.0,
                cumulative_pct: 0.0,
                risk: RiskLabel::Normal,
                recommendation: Recommendation::Wait,
                confidence: 80.0 - i as f64,
            })
            .collect()
    }

    #[test]
    fn min_price_prefers_earliest_tie() {
        let d = days(&[2400.0, 2390.0, 2395.0, 2390.0]);
        let best = min_price_entry(&d).unwrap();
        assert_eq!(best.day, Some(2));
        assert_eq!(best.price, 2390.0);
        assert!(!best.synthetic);
    }

    #[test]
    fn hashed_day_inside_window_uses_that_day() {
        let d = days(&[2400.0, 2410.0, 2420.0]);
        let best = hashed_day_entry(&d, d[1].date).unwrap();
        assert_eq!(best.price, 2410.0);
        assert_eq!(best.day, Some(2));
        assert_eq!(best.strategy, BestEntryStrategy::HashedDay);
    }

    #[test]
    fn hashed_day_outside_window_is_synthetic_average() {
        let d = days(&[2400.0, 2410.0, 2420.0]);
        let date = NaiveDate::from_ymd_opt(2026, 4, 30).unwrap();
        let best = hashed_day_entry(&d, date).unwrap();
        assert!(best.synthetic);
        assert_eq!(best.date, date);
        assert_eq!(best.price, 2410.0);
        assert_eq!(best.confidence, 79.0);
        assert_eq!(best.day, None);
    }
}
