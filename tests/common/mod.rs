#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use price_forecast::domain::Record;
use price_forecast::domain::columns;

/// `n` daily rows starting on `start`, prices from `price(i)`.
pub fn rows_with(start: NaiveDate, n: usize, qty: Option<f64>, price: impl Fn(usize) -> f64) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let mut r = Record::new();
            r.insert(
                columns::DATE,
                (start + Duration::days(i as i64)).format("%d/%m/%Y").to_string(),
            );
            r.insert(columns::PRICE, format!("{:.3}", price(i)));
            if let Some(q) = qty {
                r.insert(columns::QTY_ARRIVED, format!("{q:.1}"));
            }
            r
        })
        .collect()
}

pub fn feb_2026() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 8).unwrap()
}

/// A mildly noisy upward series.
pub fn wavy_rows(n: usize) -> Vec<Record> {
    rows_with(feb_2026(), n, Some(12_500.0), |i| {
        2360.0 + 1.5 * i as f64 + ((i * 37) % 17) as f64 - 8.0
    })
}
