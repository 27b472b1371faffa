//! Regression frame assembly.
//!
//! A [`RegressionFrame`] is built fresh for every forecast request from one
//! country's records up to and including the reference date. It is sorted
//! ascending by `ds`, never empty, and every numeric column is finite.

use crate::features;
use chrono::NaiveDate;
use cvd_core::{DailyRecord, ForecastError, PredictionType, Result};
use log::{info, warn};

/// One row of the model-facing frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionRow {
    pub ds: NaiveDate,
    /// `ln(1 + confirmed)`
    pub cases_log: f64,
    /// `100 * deaths / confirmed`, or `0` with nothing confirmed
    pub mortality_rate: f64,
    /// Cumulative count of the requested metric.
    pub y: f64,
}

impl RegressionRow {
    pub fn from_record(record: &DailyRecord, target: PredictionType) -> Self {
        let y = match target {
            PredictionType::Cases => record.confirmed,
            PredictionType::Deaths => record.deaths,
            PredictionType::Recovered => record.recovered,
        };
        Self {
            ds: record.date,
            cases_log: features::cases_log(record.confirmed),
            mortality_rate: features::mortality_rate(record.confirmed, record.deaths),
            y: y as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionFrame {
    country: String,
    reference_date: NaiveDate,
    target: PredictionType,
    rows: Vec<RegressionRow>,
}

impl RegressionFrame {
    /// Assemble the frame for `country` as of `reference_date`.
    ///
    /// Records dated after the reference date are ignored. Fails with
    /// [`ForecastError::NoHistoricalData`] when nothing remains.
    pub fn assemble(
        country: &str,
        records: &[DailyRecord],
        reference_date: NaiveDate,
        target: PredictionType,
    ) -> Result<Self> {
        let rows: Vec<RegressionRow> = records
            .iter()
            .filter(|r| r.date <= reference_date)
            .map(|r| RegressionRow::from_record(r, target))
            .collect();
        let frame = Self::from_rows(country, reference_date, target, rows)?;
        let gaps = frame.gaps();
        info!(
            "[CVD] assembler: {} frame has {} rows through {} ({} gaps)",
            country,
            frame.len(),
            frame.last_date(),
            gaps.len()
        );
        Ok(frame)
    }

    /// Build a frame from prepared rows.
    ///
    /// Rows are sorted by `ds`; for repeated dates the last row is kept.
    /// Non-finite `mortality_rate` and `y` are zeroed and non-finite
    /// `cases_log` is filled with `0` and logged. Rows after
    /// `reference_date` are dropped.
    pub fn from_rows(
        country: &str,
        reference_date: NaiveDate,
        target: PredictionType,
        mut rows: Vec<RegressionRow>,
    ) -> Result<Self> {
        rows.retain(|r| r.ds <= reference_date);
        if rows.is_empty() {
            return Err(ForecastError::NoHistoricalData {
                country: country.to_string(),
                reference_date,
            });
        }

        // stable sort keeps input order among equal dates
        rows.sort_by_key(|r| r.ds);
        let mut deduped: Vec<RegressionRow> = Vec::with_capacity(rows.len());
        for row in rows {
            match deduped.last_mut() {
                Some(last) if last.ds == row.ds => *last = row,
                _ => deduped.push(row),
            }
        }

        let mut filled = 0usize;
        for row in &mut deduped {
            if !row.mortality_rate.is_finite() {
                row.mortality_rate = 0.0;
            }
            if !row.y.is_finite() {
                row.y = 0.0;
            }
            if !row.cases_log.is_finite() {
                row.cases_log = 0.0;
                filled += 1;
            }
        }
        if filled > 0 {
            warn!(
                "[CVD] assembler: {} non-finite cases_log values in {} frame filled with 0",
                filled, country
            );
        }

        Ok(Self {
            country: country.to_string(),
            reference_date,
            target,
            rows: deduped,
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn target(&self) -> PredictionType {
        self.target
    }

    pub fn rows(&self) -> &[RegressionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false; an empty frame cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ds(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.ds).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.rows[0].ds
    }

    pub fn last_date(&self) -> NaiveDate {
        self.rows[self.rows.len() - 1].ds
    }

    /// Look up the regressor for a historical date.
    pub fn cases_log_on(&self, ds: NaiveDate) -> Option<f64> {
        self.rows
            .binary_search_by_key(&ds, |r| r.ds)
            .ok()
            .map(|i| self.rows[i].cases_log)
    }

    /// Missing calendar days, as `(before, after)` pairs of present dates.
    pub fn gaps(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.rows
            .windows(2)
            .filter(|w| (w[1].ds - w[0].ds).num_days() > 1)
            .map(|w| (w[0].ds, w[1].ds))
            .collect()
    }
}
