//! CSV data loading for populating the in-memory SQLite database.
//!
//! # CSV Format
//!
//! Headers are required and matched case-insensitively; extra columns are
//! ignored and column order does not matter.
//!
//! ```text
//! country,date,confirmed,deaths,recovered
//! Testland,2020-01-01,1,0,0
//! ```
//!
//! `cases` is accepted in place of `confirmed`. Missing or unparseable counts
//! are stored as zero. Rows with an empty country or an unparseable date are
//! skipped.

use crate::models::IngestSummary;
use crate::Database;
use cvd_core::DailyRecord;
use cvd_data::{derive_dataset, features, RawRow};
use cvd_utils::dates::{format_date, parse_date_lenient};
use cvd_utils::numbers::parse_count;
use rusqlite::{params, Statement};

const INSERT_SQL: &str = "INSERT OR REPLACE INTO daily_records
     (country, date, confirmed, deaths, recovered,
      new_cases, new_deaths, new_recovered, mortality_rate)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

/// Column positions resolved from the header row.
struct Columns {
    country: usize,
    date: usize,
    confirmed: usize,
    deaths: Option<usize>,
    recovered: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> anyhow::Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let country = find("country")
            .ok_or_else(|| anyhow::anyhow!("CSV is missing the 'country' column"))?;
        let date =
            find("date").ok_or_else(|| anyhow::anyhow!("CSV is missing the 'date' column"))?;
        let confirmed = find("confirmed")
            .or_else(|| find("cases"))
            .ok_or_else(|| anyhow::anyhow!("CSV has neither a 'confirmed' nor a 'cases' column"))?;
        Ok(Self {
            country,
            date,
            confirmed,
            deaths: find("deaths"),
            recovered: find("recovered"),
        })
    }

    fn count(&self, record: &csv::StringRecord, column: Option<usize>) -> Option<i64> {
        column.and_then(|i| record.get(i)).and_then(parse_count)
    }
}

fn insert(stmt: &mut Statement<'_>, record: &DailyRecord) -> rusqlite::Result<usize> {
    stmt.execute(params![
        record.country,
        format_date(&record.date),
        to_sql_count(record.confirmed),
        to_sql_count(record.deaths),
        to_sql_count(record.recovered),
        to_sql_count(record.new_cases),
        to_sql_count(record.new_deaths),
        to_sql_count(record.new_recovered),
        features::mortality_rate(record.confirmed, record.deaths),
    ])
}

// SQLite integers are signed 64-bit.
pub(crate) fn to_sql_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl Database {
    /// Replace the whole table with the records derived from `csv_data`.
    ///
    /// Parsing and derivation happen before the database is touched, so a
    /// malformed file leaves the previous contents in place. The delete and
    /// all inserts run in a single transaction.
    pub fn replace_all_from_csv(&self, csv_data: &str) -> anyhow::Result<IngestSummary> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());
        let columns = Columns::from_headers(rdr.headers()?)?;

        let mut rows = Vec::new();
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let country = r.get(columns.country).unwrap_or("").trim();
            if country.is_empty() {
                skipped += 1;
                continue;
            }
            let date = match r.get(columns.date).and_then(parse_date_lenient) {
                Some(d) => d,
                None => {
                    skipped += 1;
                    continue;
                }
            };
            rows.push(RawRow {
                country: country.to_string(),
                date,
                confirmed: columns.count(&r, Some(columns.confirmed)),
                deaths: columns.count(&r, columns.deaths),
                recovered: columns.count(&r, columns.recovered),
            });
        }
        if skipped > 0 {
            log::warn!(
                "[CVD] loader: skipped {} rows with an empty country or unparseable date",
                skipped
            );
        }

        let dataset = derive_dataset(rows);

        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM daily_records", [])?;
        {
            let mut stmt = tx.prepare(INSERT_SQL)?;
            for record in &dataset.records {
                insert(&mut stmt, record)?;
            }
        }
        tx.commit()?;

        let summary = IngestSummary {
            records: dataset.records.len(),
            countries: dataset.country_count(),
            skipped,
            duplicates: dataset.duplicates,
            clamped: dataset.clamped,
        };
        log::info!(
            "[CVD] loader: Replaced {} rows with {} records for {} countries",
            removed,
            summary.records,
            summary.countries
        );
        Ok(summary)
    }

    /// Add a single record, replacing any existing row for the same country
    /// and date.
    ///
    /// The record's daily counts are stored as given; neighbouring rows are
    /// not re-derived.
    pub fn insert_record(&self, record: &DailyRecord) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(INSERT_SQL)?;
        insert(&mut stmt, record)?;
        log::info!(
            "[CVD] loader: Inserted record {} {}",
            record.country,
            format_date(&record.date)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use chrono::NaiveDate;
    use cvd_core::{CumulativeCounts, DailyRecord, NewCounts};

    const TESTLAND_CSV: &str = "\
country,date,cases,deaths,recovered
Testland,2020-01-01,1,0,0
Testland,2020-01-02,5,0,0
Testland,2020-01-03,3,0,0
Testland,2020-01-04,10,1,0
Testland,2020-01-05,10,1,2
";

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    fn count_rows(db: &Database) -> i64 {
        db.conn
            .borrow()
            .query_row("SELECT COUNT(*) FROM daily_records", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_replace_all_derives_new_cases() {
        let db = Database::new().unwrap();
        let summary = db.replace_all_from_csv(TESTLAND_CSV).unwrap();
        assert_eq!(summary.records, 5);
        assert_eq!(summary.countries, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.clamped.new_cases, 1);

        let records = db.query_country_records("Testland").unwrap();
        let new_cases: Vec<u64> = records.iter().map(|r| r.new_cases).collect();
        assert_eq!(new_cases, vec![1, 4, 0, 7, 0]);
        assert_eq!(records[4].new_recovered, 2);
    }

    #[test]
    fn test_confirmed_column_preferred_over_cases() {
        let db = Database::new().unwrap();
        let csv = "country,date,confirmed,cases,deaths,recovered\nA,2020-01-01,7,99,0,0\n";
        db.replace_all_from_csv(csv).unwrap();
        assert_eq!(db.query_country_records("A").unwrap()[0].confirmed, 7);
    }

    #[test]
    fn test_headers_case_insensitive_and_reordered() {
        let db = Database::new().unwrap();
        let csv = "Date,Recovered,Country,Extra,Deaths,Confirmed\n2020-01-01,1,A,x,2,3\n";
        db.replace_all_from_csv(csv).unwrap();
        let r = &db.query_country_records("A").unwrap()[0];
        assert_eq!((r.confirmed, r.deaths, r.recovered), (3, 2, 1));
    }

    #[test]
    fn test_bad_rows_skipped_and_counts_coerced() {
        let db = Database::new().unwrap();
        let csv = "\
country,date,confirmed,deaths,recovered
,2020-01-01,1,0,0
A,not-a-date,1,0,0
A,2020-01-01,,NaN,-4
A,2020-01-02,2.0,1,0
";
        let summary = db.replace_all_from_csv(csv).unwrap();
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.records, 2);

        let records = db.query_country_records("A").unwrap();
        assert_eq!(records[0].confirmed, 0);
        assert_eq!(records[0].deaths, 0);
        assert_eq!(records[0].recovered, 0);
        assert_eq!(records[1].confirmed, 2);
        assert_eq!(records[1].new_cases, 2);
    }

    #[test]
    fn test_replace_all_discards_previous_rows() {
        let db = Database::new().unwrap();
        db.replace_all_from_csv(TESTLAND_CSV).unwrap();
        db.replace_all_from_csv("country,date,confirmed,deaths,recovered\nB,2020-02-01,1,0,0\n")
            .unwrap();
        assert_eq!(count_rows(&db), 1);
        assert_eq!(db.query_countries().unwrap(), vec!["B".to_string()]);
    }

    #[test]
    fn test_missing_country_column_keeps_previous_rows() {
        let db = Database::new().unwrap();
        db.replace_all_from_csv(TESTLAND_CSV).unwrap();
        let result = db.replace_all_from_csv("date,confirmed\n2020-01-01,1\n");
        assert!(result.is_err());
        assert_eq!(count_rows(&db), 5);
    }

    #[test]
    fn test_missing_confirmed_and_cases_is_an_error() {
        let db = Database::new().unwrap();
        let result = db.replace_all_from_csv("country,date,deaths\nA,2020-01-01,1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicates_counted() {
        let db = Database::new().unwrap();
        let csv = "country,date,confirmed,deaths,recovered\nA,2020-01-01,1,0,0\nA,2020-01-01,4,0,0\n";
        let summary = db.replace_all_from_csv(csv).unwrap();
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.records, 1);
        assert_eq!(db.query_country_records("A").unwrap()[0].confirmed, 4);
    }

    #[test]
    fn test_mortality_rate_stored() {
        let db = Database::new().unwrap();
        db.replace_all_from_csv(TESTLAND_CSV).unwrap();
        let rate: f64 = db
            .conn
            .borrow()
            .query_row(
                "SELECT mortality_rate FROM daily_records WHERE country = 'Testland' AND date = '2020-01-04'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!((rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_insert_record() {
        let db = Database::new().unwrap();
        let record = DailyRecord::new(
            "Newland",
            date(3),
            CumulativeCounts::new(20, 2, 1),
            NewCounts {
                new_cases: 5,
                new_deaths: 1,
                new_recovered: 0,
            },
        );
        db.insert_record(&record).unwrap();
        db.insert_record(&record).unwrap();
        assert_eq!(count_rows(&db), 1);
        assert_eq!(db.query_country_records("Newland").unwrap(), vec![record]);
    }
}
