//! SQL schema definitions for the in-memory SQLite database.
//!
//! The schema is applied as a single batch when the database is initialized.

/// Returns the full SQL schema as a single batch string.
///
/// `daily_records` holds one row per `(country, date)` with the cumulative
/// counts, the derived daily counts and the mortality rate computed at
/// ingest time. Dates are ISO `YYYY-MM-DD` text, so lexical order is
/// chronological order.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS daily_records (
        country TEXT NOT NULL,
        date TEXT NOT NULL,
        confirmed INTEGER NOT NULL DEFAULT 0,
        deaths INTEGER NOT NULL DEFAULT 0,
        recovered INTEGER NOT NULL DEFAULT 0,
        new_cases INTEGER NOT NULL DEFAULT 0,
        new_deaths INTEGER NOT NULL DEFAULT 0,
        new_recovered INTEGER NOT NULL DEFAULT 0,
        mortality_rate REAL NOT NULL DEFAULT 0,
        PRIMARY KEY (country, date)
    );
    CREATE INDEX IF NOT EXISTS idx_records_country ON daily_records(country);
    CREATE INDEX IF NOT EXISTS idx_records_date ON daily_records(date);
    "#
}
