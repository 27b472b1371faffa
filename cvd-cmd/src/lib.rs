//! Command implementations for the COVID-19 forecasting CLI.
//!
//! Every command except `reload` loads the source CSV into a fresh
//! in-memory database before doing its work.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use cvd_db::Database;

pub mod forecast;
pub mod records;

#[derive(Subcommand)]
pub enum Command {
    /// Load the CSV and print the ingest summary as JSON
    Ingest,

    /// List countries with their date span and latest totals
    Countries {
        /// Print only the country names, one per line
        #[arg(long)]
        names_only: bool,
    },

    /// Print a country's daily records as CSV
    History {
        /// Country to list
        #[arg(short, long)]
        country: String,

        /// Records to skip before printing
        #[arg(long, default_value_t = 0)]
        skip: u32,

        /// Maximum number of records to print
        #[arg(short, long, default_value_t = cvd_db::DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },

    /// Forecast a country's series and print the response as JSON
    Forecast {
        /// Path to the JSON model artifact
        #[arg(short, long)]
        model: String,

        /// Country to forecast
        #[arg(short, long)]
        country: String,

        /// Horizon in days (1-30)
        #[arg(short, long, default_value_t = 7, allow_negative_numbers = true)]
        days: i64,

        /// Series to forecast: cases, deaths or recovered
        #[arg(short = 't', long = "type", default_value = "cases")]
        prediction_type: String,

        /// As-of date (YYYY-MM-DD); defaults to the country's latest record
        #[arg(short, long)]
        reference_date: Option<NaiveDate>,
    },

    /// Load the model, invalidate the cache and load it again, printing
    /// the load generation before and after
    Reload {
        /// Path to the JSON model artifact
        #[arg(short, long)]
        model: String,
    },
}

/// Read `data_path` into a new in-memory database.
pub fn open_database(data_path: &str) -> anyhow::Result<(Database, cvd_db::IngestSummary)> {
    let csv_data = std::fs::read_to_string(data_path)
        .with_context(|| format!("Failed to read data file '{}'", data_path))?;
    let db = Database::new()?;
    let summary = db
        .replace_all_from_csv(&csv_data)
        .with_context(|| format!("Failed to ingest '{}'", data_path))?;
    Ok((db, summary))
}

pub fn run(data_path: &str, command: Command) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    if let Command::Reload { model } = &command {
        return forecast::run_reload(&mut out, model);
    }

    let (db, summary) = open_database(data_path)?;
    match command {
        Command::Ingest => records::write_summary(&mut out, &summary),
        Command::Countries { names_only } => {
            records::write_countries(&mut out, &db, names_only)
        }
        Command::History {
            country,
            skip,
            limit,
        } => records::write_history(&mut out, &db, &country, skip, limit),
        Command::Forecast {
            model,
            country,
            days,
            prediction_type,
            reference_date,
        } => {
            let args = forecast::ForecastArgs {
                model_path: model,
                country,
                days,
                prediction_type,
                reference_date,
            };
            forecast::run_forecast(&mut out, &db, &args)
        }
        // handled above; needs no data file
        Command::Reload { .. } => Ok(()),
    }
}
