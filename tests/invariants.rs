use chrono::NaiveDate;
use proptest::prelude::*;

use price_forecast::domain::{Features, Recommendation, RiskLabel};
use price_forecast::fingerprint::days_in_month;
use price_forecast::sim::simulator::{classify_recommendation, classify_risk, confidence, project};
use price_forecast::sim::SeededStream;

fn features(price: f64, slope: f64, momentum: f64, volatility: f64, supply: f64) -> Features {
    Features {
        sma7: price,
        sma14: price,
        sma30: price,
        ema7: price,
        ema14: price,
        slope14: slope,
        momentum,
        volatility,
        seasonal: [0.0; 7],
        supply_pressure: supply,
        last_price: price,
        last_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
        trailing: vec![price; 30],
    }
}

proptest! {
    #[test]
    fn projection_stays_in_band_and_confidence_in_bounds(
        price in 100.0f64..10_000.0,
        slope in -200.0f64..200.0,
        momentum in -0.5f64..0.5,
        volatility in 0.0f64..0.3,
        supply in -0.004f64..0.004,
        seed in any::<u64>(),
    ) {
        let f = features(price, slope, momentum, volatility, supply);
        let days = project(&f, &mut SeededStream::new(seed));
        prop_assert_eq!(days.len(), 30);
        for d in &days {
            prop_assert!(d.price >= price * 0.85 - 1e-9 && d.price <= price * 1.15 + 1e-9);
            prop_assert!((40.0..=95.0).contains(&d.confidence));
        }
    }

    #[test]
    fn same_seed_same_projection(seed in any::<u64>(), volatility in 0.0f64..0.1) {
        let f = features(2400.0, 1.0, 0.01, volatility, 0.0);
        let a = project(&f, &mut SeededStream::new(seed));
        let b = project(&f, &mut SeededStream::new(seed));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn recommendation_follows_first_matching_rule(change in -10.0f64..10.0, volatility in 0.0f64..0.06) {
        let risk = classify_risk(change, volatility);
        let rec = classify_recommendation(change, risk);
        let expected = if change < -1.5 && risk == RiskLabel::Normal {
            Recommendation::StrongBuy
        } else if change < -0.5 && risk == RiskLabel::Normal {
            Recommendation::Buy
        } else if change < 0.0 {
            Recommendation::Accumulate
        } else {
            Recommendation::Wait
        };
        prop_assert_eq!(rec, expected);
    }

    #[test]
    fn confidence_is_bounded(i in 0usize..30, volatility in 0.0f64..1.0, jitter in -2.0f64..2.0) {
        let c = confidence(i, volatility, jitter);
        prop_assert!((40.0..=95.0).contains(&c));
    }

    #[test]
    fn month_lengths_are_valid(year in 1900i32..2200, month in 1u32..=12) {
        let n = days_in_month(year, month);
        prop_assert!((28..=31).contains(&n));
        prop_assert!(NaiveDate::from_ymd_opt(year, month, n).is_some());
    }
}
