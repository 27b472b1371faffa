//! Typed query methods for retrieving daily records from the database.
//!
//! Counts are stored as signed SQLite integers and read back as `u64`;
//! dates round-trip through the ISO text column.

use crate::loader::to_sql_count;
use crate::models::CountryLatest;
use crate::Database;
use chrono::NaiveDate;
use cvd_core::{CumulativeCounts, DailyRecord, NewCounts};
use cvd_data::{derive_new_counts, features};
use cvd_utils::dates::format_date;
use rusqlite::{params, OptionalExtension, Row};

/// Default page size for [`Database::query_records`].
pub const DEFAULT_PAGE_LIMIT: u32 = 10_000;

const RECORD_COLUMNS: &str = "country, date, confirmed, deaths, recovered,
     new_cases, new_deaths, new_recovered";

fn count(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    Ok(value.max(0) as u64)
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<DailyRecord> {
    let country: String = row.get(0)?;
    let date: NaiveDate = row.get(1)?;
    Ok(DailyRecord::new(
        &country,
        date,
        CumulativeCounts::new(count(row, 2)?, count(row, 3)?, count(row, 4)?),
        NewCounts {
            new_cases: count(row, 5)?,
            new_deaths: count(row, 6)?,
            new_recovered: count(row, 7)?,
        },
    ))
}

impl Database {
    /// Distinct countries, alphabetical.
    pub fn query_countries(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.borrow();
        let mut stmt =
            conn.prepare("SELECT DISTINCT country FROM daily_records ORDER BY country")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        log::info!(
            "[CVD] query: query_countries returned {} countries",
            rows.len()
        );
        Ok(rows)
    }

    /// Full history for one country, ascending by date.
    ///
    /// An unknown country yields an empty vector.
    pub fn query_country_records(&self, country: &str) -> anyhow::Result<Vec<DailyRecord>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM daily_records WHERE country = ?1 ORDER BY date",
            RECORD_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![country], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[CVD] query: query_country_records({}) returned {} records",
            country,
            rows.len()
        );
        Ok(rows)
    }

    /// Paginated listing ordered by country, then date.
    ///
    /// `country` restricts the listing to one country when given.
    pub fn query_records(
        &self,
        country: Option<&str>,
        skip: u32,
        limit: u32,
    ) -> anyhow::Result<Vec<DailyRecord>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM daily_records
             WHERE ?1 IS NULL OR country = ?1
             ORDER BY country, date
             LIMIT ?2 OFFSET ?3",
            RECORD_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![country, limit, skip], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[CVD] query: query_records(skip={}, limit={}) returned {} records",
            skip,
            limit,
            rows.len()
        );
        Ok(rows)
    }

    /// Most recent date recorded for `country`, if any.
    pub fn query_latest_date(&self, country: &str) -> anyhow::Result<Option<NaiveDate>> {
        let conn = self.conn.borrow();
        let latest: Option<NaiveDate> = conn.query_row(
            "SELECT MAX(date) FROM daily_records WHERE country = ?1",
            params![country],
            |row| row.get(0),
        )?;
        Ok(latest)
    }

    /// Per-country date span and totals on the latest date, alphabetical.
    pub fn query_country_summaries(&self) -> anyhow::Result<Vec<CountryLatest>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT r.country, s.first_date, s.last_date, s.records,
                    r.confirmed, r.deaths, r.recovered, r.mortality_rate
             FROM daily_records r
             INNER JOIN (
                 SELECT country, MIN(date) AS first_date, MAX(date) AS last_date,
                        COUNT(*) AS records
                 FROM daily_records
                 GROUP BY country
             ) s ON r.country = s.country AND r.date = s.last_date
             ORDER BY r.country",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CountryLatest {
                    country: row.get(0)?,
                    first_date: row.get(1)?,
                    last_date: row.get(2)?,
                    records: row.get(3)?,
                    confirmed: count(row, 4)?,
                    deaths: count(row, 5)?,
                    recovered: count(row, 6)?,
                    mortality_rate: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[CVD] query: query_country_summaries returned {} countries",
            rows.len()
        );
        Ok(rows)
    }

    /// Overwrite the cumulative counts of the record for `country` on `date`.
    /// Returns whether a row existed; no row is created.
    ///
    /// The row's daily counts are re-derived against the previous stored
    /// date and its mortality rate recomputed. Later rows keep their stored
    /// daily counts.
    pub fn update_record(
        &self,
        country: &str,
        date: NaiveDate,
        counts: CumulativeCounts,
    ) -> anyhow::Result<bool> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let previous = tx
            .query_row(
                "SELECT confirmed, deaths, recovered FROM daily_records
                 WHERE country = ?1 AND date < ?2
                 ORDER BY date DESC LIMIT 1",
                params![country, format_date(&date)],
                |row| Ok(CumulativeCounts::new(count(row, 0)?, count(row, 1)?, count(row, 2)?)),
            )
            .optional()?;
        let series: Vec<CumulativeCounts> = previous.into_iter().chain([counts]).collect();
        let new = derive_new_counts(&series)
            .counts
            .last()
            .copied()
            .unwrap_or_default();

        let updated = tx.execute(
            "UPDATE daily_records
             SET confirmed = ?3, deaths = ?4, recovered = ?5,
                 new_cases = ?6, new_deaths = ?7, new_recovered = ?8,
                 mortality_rate = ?9
             WHERE country = ?1 AND date = ?2",
            params![
                country,
                format_date(&date),
                to_sql_count(counts.confirmed),
                to_sql_count(counts.deaths),
                to_sql_count(counts.recovered),
                to_sql_count(new.new_cases),
                to_sql_count(new.new_deaths),
                to_sql_count(new.new_recovered),
                features::mortality_rate(counts.confirmed, counts.deaths),
            ],
        )?;
        tx.commit()?;
        if updated == 0 {
            return Ok(false);
        }
        log::info!(
            "[CVD] query: updated record {} {}",
            country,
            format_date(&date)
        );
        Ok(true)
    }

    /// Remove the record for `country` on `date`. Returns whether a row existed.
    ///
    /// Later rows keep their stored daily counts.
    pub fn delete_record(&self, country: &str, date: NaiveDate) -> anyhow::Result<bool> {
        let conn = self.conn.borrow();
        let removed = conn.execute(
            "DELETE FROM daily_records WHERE country = ?1 AND date = ?2",
            params![country, format_date(&date)],
        )?;
        if removed == 0 {
            return Ok(false);
        }
        log::info!(
            "[CVD] query: deleted record {} {}",
            country,
            format_date(&date)
        );
        Ok(true)
    }
}
