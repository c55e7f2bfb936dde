//! Deterministic "best purchase day" derived purely from dataset content.
//!
//! The date-sorted series is serialized canonically and hashed; the first
//! 32 bits of the digest pick a day in the month after the last observation:
//!
//! ```text
//! day = (u32::from_be_bytes(digest[..4]) mod days_in_month) + 1
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::error::ForecastError;
use crate::fingerprint::{canonical_serialization, sha256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySelection {
    pub date: NaiveDate,
    pub day_of_month: u32,
    pub months_ahead: u32,
    pub days_in_month: u32,
    /// Full SHA-256 hex of the sorted series.
    pub digest: String,
    /// First 8 hex characters of `digest`.
    pub prefix: String,
    pub hash_int: u32,
}

/// Digest of the date-sorted series.
pub fn day_digest(series: &PriceSeries) -> [u8; 32] {
    sha256(&canonical_serialization(series.records()))
}

/// Pick the deterministic day in the month following the last observation.
pub fn select_deterministic_day(series: &PriceSeries) -> Result<DaySelection, ForecastError> {
    let last = series.last().ok_or(ForecastError::EmptySeries)?;
    let (year, month) = next_month(last.date.year(), last.date.month());
    let days = days_in_month(year, month);

    let digest = day_digest(series);
    let hash_int = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    let day_of_month = (hash_int % days) + 1;

    let date = next_month_day(last.date, day_of_month);

    let digest_hex = hex::encode(digest);
    Ok(DaySelection {
        date,
        day_of_month,
        months_ahead: 1,
        days_in_month: days,
        prefix: digest_hex[..8].to_string(),
        digest: digest_hex,
        hash_int,
    })
}

/// `day_of_month` (already within the month's length) in the month after `last`.
///
/// Only a `last` in the final month of the representable calendar has no next
/// month; the selection then stays on `last`.
fn next_month_day(last: NaiveDate, day_of_month: u32) -> NaiveDate {
    let (year, month) = next_month(last.year(), last.month());
    NaiveDate::from_ymd_opt(year, month, day_of_month).unwrap_or(last)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// Number of days in a calendar month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = next_month(year, month);
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(ny, nm, 1),
    ) {
        (Some(start), Some(end)) => (end - start).num_days() as u32,
        _ => 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Record, columns};

    fn series(last_day: &str) -> PriceSeries {
        let rows: Vec<Record> = ["01/12/2025", "15/12/2025", last_day]
            .iter()
            .enumerate()
            .map(|(i, d)| {
                [(columns::DATE, d.to_string()), (columns::PRICE, format!("{}", 2400 + i))]
                    .into_iter()
                    .collect()
            })
            .collect();
        PriceSeries::from_records(&rows).unwrap()
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 4), 30);
    }

    #[test]
    fn next_month_day_handles_year_end_and_calendar_end() {
        let dec = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        assert_eq!(next_month_day(dec, 31), NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        assert_eq!(next_month_day(NaiveDate::MAX, 1), NaiveDate::MAX);
    }

    #[test]
    fn december_rolls_into_january() {
        let sel = select_deterministic_day(&series("31/12/2025")).unwrap();
        assert_eq!(sel.date.year(), 2026);
        assert_eq!(sel.date.month(), 1);
        assert_eq!(sel.days_in_month, 31);
        assert!((1..=31).contains(&sel.day_of_month));
        assert_eq!(sel.months_ahead, 1);
    }

    #[test]
    fn day_follows_hash_prefix() {
        let sel = select_deterministic_day(&series("20/12/2025")).unwrap();
        let int_val = u32::from_str_radix(&sel.prefix, 16).unwrap();
        assert_eq!(int_val, sel.hash_int);
        assert_eq!(sel.day_of_month, int_val % sel.days_in_month + 1);
        assert_eq!(sel.digest.len(), 64);
    }

    #[test]
    fn selection_is_repeatable_and_input_order_independent() {
        let rows: Vec<Record> = ["03/01/2026", "01/01/2026", "02/01/2026"]
            .iter()
            .map(|d| [(columns::DATE, *d), (columns::PRICE, "2400")].into_iter().collect())
            .collect();
        let mut reversed = rows.clone();
        reversed.reverse();
        let a = select_deterministic_day(&PriceSeries::from_records(&rows).unwrap()).unwrap();
        let b = select_deterministic_day(&PriceSeries::from_records(&reversed).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
