//! CSV ingest.
//!
//! Turns a market-history CSV into named-field [`Record`]s. Cell text is kept
//! verbatim (trimmed) because the fingerprint is computed over it; no numeric
//! normalization happens here.
//!
//! Design goals:
//! - **Strict schema** for the date column (clear error + exit code 2)
//! - **Row-level validation** (skip malformed rows, but report what happened)
//! - **Deterministic behavior**: rows keep file order

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::Record;
use crate::domain::columns;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Rows in file order plus what was dropped on the way.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a CSV file into records.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let dataset = read_dataset(file)?;
    debug!(
        path = %path.display(),
        rows = dataset.rows.len(),
        skipped = dataset.row_errors.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Same as [`load_dataset`] over any reader.
pub fn read_dataset<R: Read>(input: R) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(normalize_header_name)
        .collect();

    if !columns::DATE_ALIASES
        .iter()
        .any(|alias| headers.iter().any(|h| h == alias))
    {
        return Err(AppError::new(
            2,
            format!("Missing required column: `{}`", columns::DATE),
        ));
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        if record.iter().all(str::is_empty) {
            continue;
        }

        match to_record(&record, &headers) {
            Ok(r) => rows.push(r),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for e in &row_errors {
        warn!(line = e.line, message = %e.message, "skipped CSV row");
    }

    Ok(Dataset {
        headers,
        rows,
        row_errors,
        rows_read,
    })
}

fn to_record(record: &StringRecord, headers: &[String]) -> Result<Record, String> {
    if record.len() > headers.len() {
        return Err(format!(
            "row has {} cells but the header has {}",
            record.len(),
            headers.len()
        ));
    }
    // Short rows leave trailing columns absent; they serialize as empty cells.
    Ok(headers
        .iter()
        .zip(record.iter())
        .map(|(h, v)| (h.as_str(), v))
        .collect())
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Column names are otherwise case-sensitive.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_in_file_order() {
        let csv = "\u{feff}time,Avg.Price (Rs./Kg),Temp\n02/02/2026, 2405 ,21\n01/02/2026,2400,20\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.headers[0], "time");
        assert_eq!(ds.rows.len(), 2);
        assert_eq!(ds.rows[0].get("time"), Some("02/02/2026"));
        assert_eq!(ds.rows[0].get(columns::PRICE), Some("2405"));
        assert_eq!(ds.rows_read, 2);
    }

    #[test]
    fn short_rows_are_kept_and_long_rows_reported() {
        let csv = "time,Avg.Price (Rs./Kg),Temp\n01/02/2026,2400\n02/02/2026,2401,20,extra\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.rows.len(), 1);
        assert_eq!(ds.rows[0].get("Temp"), None);
        assert_eq!(ds.row_errors.len(), 1);
        assert_eq!(ds.row_errors[0].line, 3);
    }

    #[test]
    fn missing_date_column_is_input_error() {
        let err = read_dataset("price\n2400\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
