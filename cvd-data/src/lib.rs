//! Data processing for daily COVID-19 records.
//!
//! This crate turns raw cumulative counts into the derived daily values
//! stored at ingest time, and assembles the per-request regression frame
//! consumed by the forecasting engine. Both paths compute their features
//! through [`features`] so ingest and forecast never disagree.

pub mod derive;
pub mod frame;

pub use derive::{derive_dataset, derive_new_counts, ClampStats, DerivedCounts, DerivedDataset, RawRow};
pub use frame::{RegressionFrame, RegressionRow};

/// Feature columns shared by ingest and forecast.
pub mod features {
    /// Variance-stabilised regressor: `ln(1 + confirmed)`.
    pub fn cases_log(confirmed: u64) -> f64 {
        (confirmed as f64).ln_1p()
    }

    /// Deaths per hundred confirmed cases, `0` when nothing is confirmed.
    pub fn mortality_rate(confirmed: u64, deaths: u64) -> f64 {
        if confirmed == 0 {
            return 0.0;
        }
        let rate = 100.0 * deaths as f64 / confirmed as f64;
        if rate.is_finite() {
            rate
        } else {
            0.0
        }
    }

}
