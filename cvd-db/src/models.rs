//! Result structs returned by ingest and queries.
//!
//! All structs derive `Serialize` so the CLI can print them as JSON.

use chrono::NaiveDate;
use cvd_data::ClampStats;
use serde::Serialize;

/// Outcome of one full re-ingest.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IngestSummary {
    /// Rows written to `daily_records`.
    pub records: usize,
    pub countries: usize,
    /// Source rows dropped for an empty country or an unparseable date.
    pub skipped: u32,
    /// Source rows replaced by a later row for the same country and date.
    pub duplicates: u32,
    /// Negative daily deltas clamped to zero.
    pub clamped: ClampStats,
}

/// Latest cumulative totals for one country.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountryLatest {
    pub country: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub records: u32,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
    /// Deaths per hundred confirmed cases on `last_date`.
    pub mortality_rate: f64,
}
