//! Forecast model contract and the coefficient model shipped as JSON.
//!
//! A model receives a [`FutureFrame`]: the historical dates plus the
//! horizon, each carrying a filled `cases_log` regressor. It returns one
//! [`ModelPoint`] per frame row.

use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate};
use cvd_core::{DateRange, PredictionType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

/// One row of the model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FutureRow {
    pub ds: NaiveDate,
    pub cases_log: f64,
    /// Observed value of the target; `None` past the history.
    pub y: Option<f64>,
}

/// Model input covering the history followed by the forecast horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct FutureFrame {
    pub target: PredictionType,
    pub rows: Vec<FutureRow>,
}

impl FutureFrame {
    pub fn ds(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.ds).collect()
    }

    /// The `cases_log` column.
    pub fn regressor(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.cases_log).collect()
    }

    /// Rows past the last observed target value.
    pub fn horizon(&self) -> &[FutureRow] {
        let start = self
            .rows
            .iter()
            .rposition(|r| r.y.is_some())
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.rows[start..]
    }
}

/// A point forecast for one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPoint {
    pub ds: NaiveDate,
    pub yhat: f64,
}

/// A trained forecasting model.
pub trait ForecastModel: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// The historical dates followed by `periods` consecutive days after
    /// the last of them.
    fn build_future_index(&self, history: &[NaiveDate], periods: u32) -> Vec<NaiveDate> {
        let mut index = history.to_vec();
        if let Some(last) = history.last() {
            index.extend(DateRange::following(*last, periods));
        }
        index
    }

    fn predict(&self, frame: &FutureFrame) -> anyhow::Result<Vec<ModelPoint>>;
}

/// Source of trained model artifacts.
pub trait ModelStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Arc<dyn ForecastModel>>;
}

/// Coefficients for one target metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub intercept: f64,
    /// Change per day since the model origin.
    pub trend: f64,
    /// Weight of the `cases_log` regressor.
    pub cases_log: f64,
    /// Additive weekday effects, Monday first. Empty for none.
    #[serde(default)]
    pub weekly: Vec<f64>,
}

/// Additive linear model: trend + regressor + weekly seasonality.
///
/// `yhat = intercept + trend * days_since(origin) + cases_log * x + weekly[weekday]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTrendModel {
    pub name: String,
    pub origin: NaiveDate,
    /// Keyed by prediction type name (`cases`, `deaths`, `recovered`).
    pub targets: HashMap<String, Coefficients>,
}

impl LinearTrendModel {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let model: LinearTrendModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.targets.is_empty() {
            bail!("model '{}' defines no targets", self.name);
        }
        for (target, coef) in &self.targets {
            if let Err(e) = target.parse::<PredictionType>() {
                bail!("model '{}': {}", self.name, e);
            }
            if !coef.weekly.is_empty() && coef.weekly.len() != 7 {
                bail!(
                    "model '{}': target '{}' has {} weekly terms, expected 7",
                    self.name,
                    target,
                    coef.weekly.len()
                );
            }
        }
        Ok(())
    }

    fn coefficients(&self, target: PredictionType) -> anyhow::Result<&Coefficients> {
        match self.targets.get(target.as_str()) {
            Some(c) => Ok(c),
            None => bail!("no coefficients for target '{}'", target),
        }
    }
}

impl ForecastModel for LinearTrendModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, frame: &FutureFrame) -> anyhow::Result<Vec<ModelPoint>> {
        let coef = self.coefficients(frame.target)?;
        let points = frame
            .rows
            .iter()
            .map(|row| {
                let t = (row.ds - self.origin).num_days() as f64;
                let seasonal = coef
                    .weekly
                    .get(row.ds.weekday().num_days_from_monday() as usize)
                    .copied()
                    .unwrap_or(0.0);
                ModelPoint {
                    ds: row.ds,
                    yhat: coef.intercept + coef.trend * t + coef.cases_log * row.cases_log + seasonal,
                }
            })
            .collect();
        Ok(points)
    }
}

/// Loads a [`LinearTrendModel`] from a JSON file on every `load()`.
#[derive(Debug, Clone)]
pub struct JsonModelStore {
    path: PathBuf,
}

impl JsonModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelStore for JsonModelStore {
    fn load(&self) -> anyhow::Result<Arc<dyn ForecastModel>> {
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading model artifact {}", self.path.display()))?;
        let model = LinearTrendModel::from_json(&json)
            .with_context(|| format!("parsing model artifact {}", self.path.display()))?;
        log::info!(
            "[CVD] model: loaded '{}' from {}",
            model.name,
            self.path.display()
        );
        Ok(Arc::new(model))
    }
}
