//! Short-horizon forecasting of daily COVID-19 series.
//!
//! # Pipeline
//!
//! ```text
//! ForecastRequest ─validate─▶ HistoricalSource ─▶ RegressionFrame
//!        ─▶ ForecastEngine (ModelCache snapshot) ─▶ format_window ─▶ ForecastResponse
//! ```
//!
//! - [`request`] validates the caller's request before any data is read.
//! - [`engine`] builds the future index, fills the `cases_log` regressor
//!   with its last known value and invokes the model.
//! - [`window`] numbers the trailing outputs from the reference date.
//! - [`cache`] holds the lazily loaded model; [`ForecastService::reload`]
//!   discards it.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use cvd_forecast::{ForecastRequest, ForecastService, JsonModelStore, ModelCache};
//!
//! let cache = Arc::new(ModelCache::new(Box::new(JsonModelStore::new("model.json"))));
//! let service = ForecastService::new(cache);
//! let records: Vec<cvd_core::DailyRecord> = Vec::new();
//! let request = ForecastRequest::new("Testland", 7, "cases", chrono::NaiveDate::from_ymd_opt(2020, 1, 5));
//! let response = service.forecast(records.as_slice(), &request);
//! ```

pub mod cache;
pub mod engine;
pub mod model;
pub mod request;
pub mod service;
pub mod window;

pub use cache::ModelCache;
pub use engine::{EngineOutput, ForecastEngine};
pub use model::{
    Coefficients, ForecastModel, FutureFrame, FutureRow, JsonModelStore, LinearTrendModel,
    ModelPoint, ModelStore,
};
pub use request::{ForecastRequest, ForecastResponse, PredictionOut, ValidatedRequest};
pub use service::ForecastService;
pub use window::{format_window, ForecastPoint};
