//! Named-field rows and the chronologically sorted price series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::columns;
use crate::error::ForecastError;

/// One parsed tabular row: column name -> raw (trimmed) cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// First non-empty value among `aliases`.
    pub fn get_any(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|a| self.get(a))
            .find(|s| !s.is_empty())
    }

    /// Value of canonical column `column`, falling back to its ingest aliases.
    pub fn get_canonical(&self, column: &str) -> Option<&str> {
        match columns::aliases_for(column) {
            [] => self.get(column),
            aliases => self.get_any(aliases),
        }
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        parse_f64(self.get(column)?)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// A single day of market history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalObservation {
    pub date: NaiveDate,
    pub price: f64,
    pub max_price: Option<f64>,
    pub qty_arrived: Option<f64>,
    pub qty_sold: Option<f64>,
    /// Every other numeric cell of the row (weather, lags, moving averages, ...).
    pub covariates: BTreeMap<String, f64>,
    /// The row this observation was built from.
    pub record: Record,
}

/// Observations sorted ascending by date with no duplicate dates.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    observations: Vec<HistoricalObservation>,
}

impl PriceSeries {
    /// Build a sorted series from ingested rows.
    ///
    /// Rows whose price is unusable are skipped unless they are the most recent
    /// row, which must carry a valid price. Duplicate dates keep the row that
    /// appeared last in the input.
    pub fn from_records(records: &[Record]) -> Result<Self, ForecastError> {
        if records.is_empty() {
            return Err(ForecastError::EmptySeries);
        }

        let mut dated = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            let raw = record.get_any(&columns::DATE_ALIASES).unwrap_or("");
            let date = parse_date(raw).ok_or_else(|| ForecastError::UnparseableDate {
                row,
                value: raw.to_string(),
            })?;
            dated.push((row, date, record));
        }

        // Stable sort keeps input order within a date, so the last one wins below.
        dated.sort_by_key(|(_, date, _)| *date);

        let (latest_row, _, latest) = dated[dated.len() - 1];
        if read_price(latest).is_none() {
            return Err(ForecastError::MissingRequiredField {
                field: columns::PRICE.to_string(),
                row: latest_row,
            });
        }

        let mut observations: Vec<HistoricalObservation> = Vec::with_capacity(dated.len());
        for (row, date, record) in dated {
            let Some(price) = read_price(record) else {
                warn!(row, %date, "skipping row without a usable price");
                continue;
            };
            let obs = observation(date, price, record);
            match observations.last_mut() {
                Some(prev) if prev.date == date => *prev = obs,
                _ => observations.push(obs),
            }
        }

        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[HistoricalObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.price).collect()
    }

    pub fn first(&self) -> Option<&HistoricalObservation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&HistoricalObservation> {
        self.observations.last()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.observations.iter().map(|o| &o.record)
    }
}

fn observation(date: NaiveDate, price: f64, record: &Record) -> HistoricalObservation {
    let skip = [columns::DATE, "date", columns::PRICE, "price"];
    let covariates = record
        .columns()
        .filter(|c| !skip.contains(c))
        .filter_map(|c| record.get_f64(c).map(|v| (c.to_string(), v)))
        .collect();

    HistoricalObservation {
        date,
        price,
        max_price: record.get_f64(columns::MAX_PRICE),
        qty_arrived: record.get_f64(columns::QTY_ARRIVED),
        qty_sold: record.get_f64(columns::QTY_SOLD),
        covariates,
        record: record.clone(),
    }
}

fn read_price(record: &Record) -> Option<f64> {
    let v = parse_f64(record.get_any(&columns::PRICE_ALIASES)?)?;
    (v > 0.0).then_some(v)
}

/// Parse a date in one of the accepted day-first or ISO formats.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 4] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];
    let s = s.trim();
    FMTS.iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, price: &str) -> Record {
        [(columns::DATE, date), (columns::PRICE, price)].into_iter().collect()
    }

    #[test]
    fn sorts_by_date_and_keeps_last_duplicate() {
        let rows = vec![
            row("03/02/2026", "2410"),
            row("01/02/2026", "2400"),
            row("03/02/2026", "2420"),
            row("02/02/2026", "2405"),
        ];
        let series = PriceSeries::from_records(&rows).unwrap();
        assert_eq!(series.prices(), vec![2400.0, 2405.0, 2420.0]);
        assert_eq!(series.last().unwrap().date, NaiveDate::from_ymd_opt(2026, 2, 3).unwrap());
    }

    #[test]
    fn empty_input_is_empty_series() {
        assert_eq!(PriceSeries::from_records(&[]), Err(ForecastError::EmptySeries));
    }

    #[test]
    fn bad_date_reports_row() {
        let rows = vec![row("01/02/2026", "2400"), row("soon", "2401")];
        assert_eq!(
            PriceSeries::from_records(&rows),
            Err(ForecastError::UnparseableDate { row: 2, value: "soon".to_string() })
        );
    }

    #[test]
    fn latest_row_requires_price_but_older_rows_are_skipped() {
        let rows = vec![row("01/02/2026", "n/a"), row("02/02/2026", "2401")];
        let series = PriceSeries::from_records(&rows).unwrap();
        assert_eq!(series.len(), 1);

        let rows = vec![row("01/02/2026", "2400"), row("02/02/2026", "")];
        assert!(matches!(
            PriceSeries::from_records(&rows),
            Err(ForecastError::MissingRequiredField { row: 2, .. })
        ));
    }

    #[test]
    fn accepts_iso_dates_and_aliases() {
        let rec: Record = [("date", "2026-02-01"), ("price", "2400.5"), ("Lag1", "2399")]
            .into_iter()
            .collect();
        let series = PriceSeries::from_records(&[rec]).unwrap();
        let obs = series.first().unwrap();
        assert_eq!(obs.price, 2400.5);
        assert_eq!(obs.covariates.get("Lag1"), Some(&2399.0));
        assert!(!obs.covariates.contains_key("price"));
    }
}
