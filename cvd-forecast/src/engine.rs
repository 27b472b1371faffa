//! Forecast engine.
//!
//! Builds the model input from a [`RegressionFrame`], extrapolates the
//! `cases_log` regressor over the horizon and keeps the trailing `days`
//! model outputs.
//!
//! # Regressor policy
//!
//! Future dates carry the last known historical `cases_log` value for the
//! whole horizon (flat continuation). The value is not projected.

use crate::cache::ModelCache;
use crate::model::{ForecastModel, FutureFrame, FutureRow, ModelPoint};
use cvd_core::{ForecastError, Result};
use cvd_data::RegressionFrame;
use log::{debug, error};
use std::sync::Arc;

/// Result of one engine run.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// Name of the model snapshot used for the whole call.
    pub model: String,
    /// The exact input handed to the model.
    pub future: FutureFrame,
    /// The trailing `days` model outputs, oldest first.
    pub forecast: Vec<ModelPoint>,
}

#[derive(Clone)]
pub struct ForecastEngine {
    cache: Arc<ModelCache>,
}

impl ForecastEngine {
    pub fn new(cache: Arc<ModelCache>) -> Self {
        Self { cache }
    }

    /// Forecast `days` points following the frame's last date.
    pub fn forecast(&self, frame: &RegressionFrame, days: u32) -> Result<EngineOutput> {
        let model = self.cache.get_or_load()?;
        let future = prepare_future(model.as_ref(), frame, days)?;

        let name = model.name().to_string();
        let predictions = model
            .predict(&future)
            .map_err(|source| ForecastError::ForecastExecution {
                model: name.clone(),
                source,
            })?;

        let wanted = days as usize;
        if predictions.len() < wanted {
            return Err(ForecastError::ForecastExecution {
                model: name,
                source: anyhow::anyhow!(
                    "model returned {} rows, expected at least {}",
                    predictions.len(),
                    wanted
                ),
            });
        }
        let forecast = predictions[predictions.len() - wanted..].to_vec();
        debug!(
            "[CVD] engine: '{}' produced {} rows, kept {}",
            name,
            predictions.len(),
            forecast.len()
        );

        Ok(EngineOutput {
            model: name,
            future,
            forecast,
        })
    }
}

/// Build the model input: history plus horizon, regressor joined and filled.
pub fn prepare_future(
    model: &dyn ForecastModel,
    frame: &RegressionFrame,
    days: u32,
) -> Result<FutureFrame> {
    let index = model.build_future_index(&frame.ds(), days);

    // left join: only historical dates find a value
    let joined: Vec<(chrono::NaiveDate, Option<f64>, Option<f64>)> = index
        .iter()
        .map(|ds| {
            let hist = frame
                .rows()
                .binary_search_by_key(ds, |r| r.ds)
                .ok()
                .map(|i| frame.rows()[i]);
            (*ds, hist.map(|r| r.cases_log), hist.map(|r| r.y))
        })
        .collect();

    let last_known = frame
        .rows()
        .iter()
        .rev()
        .map(|r| r.cases_log)
        .find(|v| v.is_finite())
        .unwrap_or(0.0);

    let mut rows = Vec::with_capacity(joined.len());
    for (ds, cases_log, y) in joined {
        let cases_log = cases_log.unwrap_or(last_known);
        if !cases_log.is_finite() {
            error!(
                "[CVD] engine: regressor missing for {} after fill; frame state: {:?}",
                ds, frame
            );
            return Err(ForecastError::RegressorMissing { date: ds });
        }
        rows.push(FutureRow { ds, cases_log, y });
    }

    Ok(FutureFrame {
        target: frame.target(),
        rows,
    })
}
