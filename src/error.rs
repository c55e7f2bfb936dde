use thiserror::Error;

/// Failures that end a single forecast request.
///
/// None of these are retried internally; the caller surfaces them and waits for
/// corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    #[error("The dataset contains no observations.")]
    EmptySeries,

    #[error("At least {required} usable price points are required, found {found}.")]
    InsufficientHistory { required: usize, found: usize },

    #[error("Row {row}: cannot parse date '{value}'.")]
    UnparseableDate { row: usize, value: String },

    #[error("Row {row}: required field `{field}` is missing or not numeric.")]
    MissingRequiredField { field: String, row: usize },
}

impl ForecastError {
    /// CLI exit code for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            ForecastError::UnparseableDate { .. } | ForecastError::MissingRequiredField { .. } => 2,
            ForecastError::EmptySeries | ForecastError::InsufficientHistory { .. } => 3,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_errors_map_to_exit_codes() {
        let e: AppError = ForecastError::InsufficientHistory { required: 30, found: 12 }.into();
        assert_eq!(e.exit_code(), 3);
        assert!(e.to_string().contains("found 12"));

        let e: AppError = ForecastError::UnparseableDate {
            row: 4,
            value: "31/02/2026".to_string(),
        }
        .into();
        assert_eq!(e.exit_code(), 2);
    }
}
