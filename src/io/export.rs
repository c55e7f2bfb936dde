//! Result and dataset exports.
//!
//! - forecast JSON: the full [`ForecastResult`], also the format `cache import` reads
//! - forecast CSV: one row per simulated day, easy to consume in spreadsheets
//! - dataset CSV: rows in canonical column order (used by `pf sample`)

use std::fs::File;
use std::path::Path;

use crate::domain::columns::CANONICAL;
use crate::domain::{ForecastResult, Record};
use crate::error::AppError;

/// Write the full result as pretty JSON.
pub fn write_result_json(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(4, format!("Failed to write forecast JSON: {e}")))?;
    Ok(())
}

/// Read a result previously written by [`write_result_json`].
pub fn read_result_json(path: &Path) -> Result<ForecastResult, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid forecast JSON: {e}")))
}

/// Write the per-day forecast table.
pub fn write_forecast_csv(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let mut w = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    w.write_record([
        "day",
        "date",
        "price_inr",
        "price_usd",
        "price_sar",
        "change_pct",
        "cumulative_pct",
        "risk",
        "recommendation",
        "confidence",
    ])
    .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for d in &result.days {
        let (usd, sar) = d
            .prices
            .map(|p| (format!("{:.4}", p.usd), format!("{:.4}", p.sar)))
            .unwrap_or_default();
        w.write_record([
            d.day.to_string(),
            d.date.format("%d-%m-%Y").to_string(),
            format!("{:.2}", d.price),
            usd,
            sar,
            format!("{:.4}", d.change_pct),
            format!("{:.4}", d.cumulative_pct),
            d.risk.display_name().to_string(),
            d.recommendation.display_name().to_string(),
            format!("{:.1}", d.confidence),
        ])
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    w.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write rows with the canonical columns as the header, in order.
pub fn write_dataset_csv(path: &Path, rows: &[Record]) -> Result<(), AppError> {
    let mut w = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create dataset CSV '{}': {e}", path.display())))?;

    w.write_record(CANONICAL)
        .map_err(|e| AppError::new(4, format!("Failed to write dataset CSV header: {e}")))?;
    for row in rows {
        w.write_record(CANONICAL.iter().map(|c| row.get_canonical(c).unwrap_or("")))
            .map_err(|e| AppError::new(4, format!("Failed to write dataset CSV row: {e}")))?;
    }

    w.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush dataset CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::load_dataset;

    #[test]
    fn dataset_csv_reloads_with_same_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let row: Record = [("time", "01/02/2026"), ("Avg.Price (Rs./Kg)", "2400.00"), ("unrelated", "x")]
            .into_iter()
            .collect();
        write_dataset_csv(&path, std::slice::from_ref(&row)).unwrap();

        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.headers.len(), CANONICAL.len());
        assert_eq!(ds.rows[0].get("time"), Some("01/02/2026"));
        assert_eq!(ds.rows[0].get("Avg.Price (Rs./Kg)"), Some("2400.00"));
        assert_eq!(ds.rows[0].get("unrelated"), None);
    }
}
