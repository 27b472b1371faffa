//! Error taxonomy for the forecasting pipeline.
//!
//! Every failure of a forecast call surfaces as one of these variants so the
//! caller can tell bad input, missing data and model failure apart.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Coarse classification of a [`ForecastError`] for the API boundary.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ErrorKind {
    BadInput,
    NotFound,
    Internal,
}

#[derive(Error, Debug)]
pub enum ForecastError {
    /// Rejected before any historical data is read.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No historical data for '{country}' at or before {reference_date}")]
    NoHistoricalData {
        country: String,
        reference_date: NaiveDate,
    },

    /// The country has no records at all.
    #[error("No historical data for '{country}'")]
    NoRecords { country: String },

    /// A regressor slot was still empty after extrapolation.
    #[error("Regressor 'cases_log' missing for {date}")]
    RegressorMissing { date: NaiveDate },

    #[error("Forecast model '{model}' failed")]
    ForecastExecution {
        model: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Model artifact could not be loaded")]
    ModelLoad {
        #[source]
        source: anyhow::Error,
    },

    #[error("Historical data source failed")]
    Source {
        #[source]
        source: anyhow::Error,
    },
}

impl ForecastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::InvalidRequest(_) => ErrorKind::BadInput,
            ForecastError::NoHistoricalData { .. } | ForecastError::NoRecords { .. } => {
                ErrorKind::NotFound
            }
            ForecastError::RegressorMissing { .. }
            | ForecastError::ForecastExecution { .. }
            | ForecastError::ModelLoad { .. }
            | ForecastError::Source { .. } => ErrorKind::Internal,
        }
    }

    /// HTTP status an API layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::BadInput => 422,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_kinds_are_distinguishable() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
        assert_eq!(
            ForecastError::InvalidRequest("days".into()).kind(),
            ErrorKind::BadInput
        );
        assert_eq!(
            ForecastError::NoHistoricalData {
                country: "Testland".into(),
                reference_date: date,
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ForecastError::RegressorMissing { date }.kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_status_codes() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
        assert_eq!(ForecastError::InvalidRequest("x".into()).status_code(), 422);
        assert_eq!(
            ForecastError::NoHistoricalData {
                country: "Testland".into(),
                reference_date: date,
            }
            .status_code(),
            404
        );
        assert_eq!(
            ForecastError::NoRecords {
                country: "Nowhere".into(),
            }
            .status_code(),
            404
        );
        let err = ForecastError::ModelLoad {
            source: anyhow::anyhow!("missing file"),
        };
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_execution_error_keeps_cause() {
        let err = ForecastError::ForecastExecution {
            model: "linear".into(),
            source: anyhow::anyhow!("no coefficients for deaths"),
        };
        assert_eq!(err.to_string(), "Forecast model 'linear' failed");
        let cause = err.source().map(|s| s.to_string());
        assert_eq!(cause.as_deref(), Some("no coefficients for deaths"));
    }

    #[test]
    fn test_no_data_display() {
        let err = ForecastError::NoHistoricalData {
            country: "Testland".into(),
            reference_date: NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "No historical data for 'Testland' at or before 2019-12-31"
        );
    }

    #[test]
    fn test_cause_is_not_repeated_in_report() {
        let err = anyhow::Error::new(ForecastError::ModelLoad {
            source: anyhow::anyhow!("missing file"),
        });
        let report = format!("{:#}", err);
        assert_eq!(report, "Model artifact could not be loaded: missing file");
        assert_eq!(report.matches("missing file").count(), 1);
    }
}
