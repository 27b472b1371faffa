//! Derived daily counts from cumulative series.
//!
//! `new_X[0] = cum_X[0]` and `new_X[i] = max(0, cum_X[i] - cum_X[i-1])`.
//! Downward corrections in the cumulative data are clamped to zero rather
//! than surfaced as negative values; every clamp is counted in
//! [`ClampStats`] and logged.

use chrono::NaiveDate;
use cvd_core::{CumulativeCounts, DailyRecord, NewCounts};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// A raw source row before coercion and derivation.
///
/// `None` counts are values that were missing or non-numeric in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub country: String,
    pub date: NaiveDate,
    pub confirmed: Option<i64>,
    pub deaths: Option<i64>,
    pub recovered: Option<i64>,
}

/// Number of negative deltas clamped to zero, per metric.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClampStats {
    pub new_cases: u32,
    pub new_deaths: u32,
    pub new_recovered: u32,
}

impl ClampStats {
    pub fn total(&self) -> u32 {
        self.new_cases + self.new_deaths + self.new_recovered
    }

    pub fn merge(&mut self, other: &ClampStats) {
        self.new_cases += other.new_cases;
        self.new_deaths += other.new_deaths;
        self.new_recovered += other.new_recovered;
    }
}

/// Output of [`derive_new_counts`]: one entry per input element.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedCounts {
    pub counts: Vec<NewCounts>,
    pub clamped: ClampStats,
}

/// Clamped difference; the flag is set when the cumulative value decreased.
fn delta(previous: u64, current: u64) -> (u64, bool) {
    match current.checked_sub(previous) {
        Some(d) => (d, false),
        None => (0, true),
    }
}

/// Derive new counts for one country's date-ordered cumulative series.
pub fn derive_new_counts(series: &[CumulativeCounts]) -> DerivedCounts {
    let mut counts = Vec::with_capacity(series.len());
    let mut clamped = ClampStats::default();
    let mut previous = CumulativeCounts::default();

    for (i, current) in series.iter().enumerate() {
        let (new_cases, c) = delta(previous.confirmed, current.confirmed);
        let (new_deaths, d) = delta(previous.deaths, current.deaths);
        let (new_recovered, r) = delta(previous.recovered, current.recovered);
        if c || d || r {
            debug!(
                "[CVD] derive: downward correction at index {} (cases={}, deaths={}, recovered={})",
                i, c, d, r
            );
        }
        clamped.new_cases += u32::from(c);
        clamped.new_deaths += u32::from(d);
        clamped.new_recovered += u32::from(r);
        counts.push(NewCounts {
            new_cases,
            new_deaths,
            new_recovered,
        });
        previous = *current;
    }

    DerivedCounts { counts, clamped }
}

/// A fully derived dataset, as produced by one full re-ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedDataset {
    /// Sorted by country, then date.
    pub records: Vec<DailyRecord>,
    pub clamped: ClampStats,
    /// Rows dropped because an earlier row had the same country and date.
    pub duplicates: u32,
}

impl DerivedDataset {
    pub fn country_count(&self) -> usize {
        let mut countries: Vec<&str> = self.records.iter().map(|r| r.country.as_str()).collect();
        countries.dedup();
        countries.len()
    }
}

/// Derive the whole dataset from raw rows in any order.
///
/// Rows are grouped by country and sorted by date. When several rows share a
/// country and date the last one wins. Missing counts are coerced to zero
/// before differencing.
pub fn derive_dataset(rows: Vec<RawRow>) -> DerivedDataset {
    let mut by_country: BTreeMap<String, BTreeMap<NaiveDate, CumulativeCounts>> = BTreeMap::new();
    let mut duplicates = 0u32;

    for row in rows {
        let counts = CumulativeCounts::coerce(row.confirmed, row.deaths, row.recovered);
        let series = by_country.entry(row.country).or_default();
        if series.insert(row.date, counts).is_some() {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        warn!(
            "[CVD] derive: {} duplicate (country, date) rows replaced by later rows",
            duplicates
        );
    }

    let mut records = Vec::new();
    let mut clamped = ClampStats::default();
    for (country, series) in &by_country {
        let cumulative: Vec<CumulativeCounts> = series.values().copied().collect();
        let derived = derive_new_counts(&cumulative);
        if derived.clamped.total() > 0 {
            warn!(
                "[CVD] derive: {} clamped {} negative deltas to zero (cases={}, deaths={}, recovered={})",
                country,
                derived.clamped.total(),
                derived.clamped.new_cases,
                derived.clamped.new_deaths,
                derived.clamped.new_recovered
            );
        }
        clamped.merge(&derived.clamped);
        for ((date, cum), new) in series.iter().zip(derived.counts) {
            records.push(DailyRecord::new(country, *date, *cum, new));
        }
    }

    info!(
        "[CVD] derive: derived {} records for {} countries",
        records.len(),
        by_country.len()
    );
    DerivedDataset {
        records,
        clamped,
        duplicates,
    }
}
