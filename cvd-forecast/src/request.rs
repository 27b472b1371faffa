//! Forecast request and response shapes exchanged with the API layer.

use crate::window::ForecastPoint;
use chrono::NaiveDate;
use cvd_core::{ForecastError, PredictionType, Result, MAX_HORIZON_DAYS, MIN_HORIZON_DAYS};
use serde::{Deserialize, Serialize};

/// A forecast request as received, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub country: String,
    pub days: i64,
    pub prediction_type: String,
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub country: String,
    pub days: u32,
    pub prediction_type: PredictionType,
    pub reference_date: NaiveDate,
}

impl ForecastRequest {
    pub fn new(country: &str, days: i64, prediction_type: &str, reference_date: Option<NaiveDate>) -> Self {
        Self {
            country: country.to_string(),
            days,
            prediction_type: prediction_type.to_string(),
            reference_date,
        }
    }

    /// Check the request without touching any data.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        let (country, days, prediction_type) = self.validate_fields()?;
        let reference_date = self.reference_date.ok_or_else(|| {
            ForecastError::InvalidRequest("reference_date must be supplied".to_string())
        })?;

        Ok(ValidatedRequest {
            country,
            days,
            prediction_type,
            reference_date,
        })
    }

    /// Check everything except the reference date, for callers that look up
    /// a default date only after the rest of the request is known to be valid.
    pub fn validate_fields(&self) -> Result<(String, u32, PredictionType)> {
        let country = self.country.trim();
        if country.is_empty() {
            return Err(ForecastError::InvalidRequest(
                "country must not be empty".to_string(),
            ));
        }
        if self.days < i64::from(MIN_HORIZON_DAYS) || self.days > i64::from(MAX_HORIZON_DAYS) {
            return Err(ForecastError::InvalidRequest(format!(
                "days must be between {} and {}, got {}",
                MIN_HORIZON_DAYS, MAX_HORIZON_DAYS, self.days
            )));
        }
        let prediction_type = self
            .prediction_type
            .parse::<PredictionType>()
            .map_err(ForecastError::InvalidRequest)?;
        Ok((country.to_string(), self.days as u32, prediction_type))
    }
}

/// One entry of [`ForecastResponse::predictions`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionOut {
    pub day: u32,
    pub predicted_value: f64,
    pub date: NaiveDate,
}

impl From<ForecastPoint> for PredictionOut {
    fn from(p: ForecastPoint) -> Self {
        Self {
            day: p.day_offset,
            predicted_value: p.predicted_value,
            date: p.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub country: String,
    pub prediction_type: PredictionType,
    pub days: u32,
    /// Exactly `days` entries, ascending by `day`.
    pub predictions: Vec<PredictionOut>,
}
