//! End-to-end forecast call: validate, assemble, forecast, format.

use crate::cache::ModelCache;
use crate::engine::ForecastEngine;
use crate::request::{ForecastRequest, ForecastResponse, PredictionOut};
use crate::window::format_window;
use cvd_core::{ForecastError, HistoricalSource, Result};
use cvd_data::RegressionFrame;
use log::{info, warn};
use std::sync::Arc;

/// Forecasting facade owned by the composition root.
#[derive(Clone)]
pub struct ForecastService {
    cache: Arc<ModelCache>,
    engine: ForecastEngine,
}

impl ForecastService {
    pub fn new(cache: Arc<ModelCache>) -> Self {
        let engine = ForecastEngine::new(Arc::clone(&cache));
        Self { cache, engine }
    }

    /// Run one forecast request against `source`.
    ///
    /// Invalid requests fail before `source` is read.
    pub fn forecast<S>(&self, source: &S, request: &ForecastRequest) -> Result<ForecastResponse>
    where
        S: HistoricalSource + ?Sized,
    {
        let request = request.validate()?;

        let records = source
            .country_records(&request.country)
            .map_err(|source| ForecastError::Source { source })?;
        let frame = RegressionFrame::assemble(
            &request.country,
            &records,
            request.reference_date,
            request.prediction_type,
        )?;
        if frame.last_date() < request.reference_date {
            warn!(
                "[CVD] service: latest {} record is {}, before reference date {}",
                request.country,
                frame.last_date(),
                request.reference_date
            );
        }

        let output = self.engine.forecast(&frame, request.days)?;
        let points = format_window(&output.forecast, request.reference_date);
        info!(
            "[CVD] service: {} {} forecast of {} days from {} with '{}'",
            request.country,
            request.prediction_type,
            points.len(),
            request.reference_date,
            output.model
        );

        Ok(ForecastResponse {
            country: request.country,
            prediction_type: request.prediction_type,
            days: request.days,
            predictions: points.into_iter().map(PredictionOut::from).collect(),
        })
    }

    /// Discard the cached model so the next forecast reloads it.
    pub fn reload(&self) {
        self.cache.invalidate();
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }
}
