//! In-memory SQLite store for daily COVID-19 records.
//!
//! This crate loads the source CSV into an in-memory SQLite database,
//! deriving the daily counts on the way in, and exposes typed query
//! methods. [`Database`] is also the [`HistoricalSource`] the forecasting
//! service reads from.
//!
//! # Usage
//!
//! ```rust
//! use cvd_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.replace_all_from_csv("country,date,cases,deaths,recovered\nTestland,2020-01-01,1,0,0\n").unwrap();
//!
//! let countries = db.query_countries().unwrap();
//! let history = db.query_country_records("Testland").unwrap();
//! assert_eq!(countries, vec!["Testland".to_string()]);
//! assert_eq!(history.len(), 1);
//! ```
//!
//! # Ingest
//!
//! Every ingest is a full replace: all rows are deleted and the derived
//! dataset inserted in one transaction. There is no isolation against
//! concurrent readers beyond that transaction.

pub mod schema;
mod loader;
mod queries;
pub mod models;

pub use models::{CountryLatest, IngestSummary};
pub use queries::DEFAULT_PAGE_LIMIT;

use cvd_core::{DailyRecord, HistoricalSource};
use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database of daily records.
///
/// Cheaply cloneable (via `Rc`); clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

impl HistoricalSource for Database {
    fn country_records(&self, country: &str) -> anyhow::Result<Vec<DailyRecord>> {
        self.query_country_records(country)
    }
}
