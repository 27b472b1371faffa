//! Ingest summary and record listings.

use cvd_db::{Database, IngestSummary};
use cvd_utils::dates::format_date;
use std::io::Write;

pub fn write_summary<W: Write>(out: &mut W, summary: &IngestSummary) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_countries<W: Write>(
    out: &mut W,
    db: &Database,
    names_only: bool,
) -> anyhow::Result<()> {
    if names_only {
        for country in db.query_countries()? {
            writeln!(out, "{}", country)?;
        }
        return Ok(());
    }
    let summaries = db.query_country_summaries()?;
    serde_json::to_writer_pretty(&mut *out, &summaries)?;
    writeln!(out)?;
    Ok(())
}

/// Write one page of a country's records as CSV with a header row.
pub fn write_history<W: Write>(
    out: &mut W,
    db: &Database,
    country: &str,
    skip: u32,
    limit: u32,
) -> anyhow::Result<()> {
    let records = db.query_records(Some(country), skip, limit)?;
    if records.is_empty() {
        log::warn!("[CVD] history: no records for '{}'", country);
    }
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "country",
        "date",
        "confirmed",
        "deaths",
        "recovered",
        "new_cases",
        "new_deaths",
        "new_recovered",
    ])?;
    for r in &records {
        wtr.write_record([
            r.country.clone(),
            format_date(&r.date),
            r.confirmed.to_string(),
            r.deaths.to_string(),
            r.recovered.to_string(),
            r.new_cases.to_string(),
            r.new_deaths.to_string(),
            r.new_recovered.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_db() -> Database {
        let db = Database::new().unwrap();
        db.replace_all_from_csv(
            "country,date,cases,deaths,recovered\n\
             Testland,2020-01-01,1,0,0\n\
             Testland,2020-01-02,5,0,0\n\
             Testland,2020-01-03,3,0,0\n\
             Alphaland,2020-01-01,2,0,0\n",
        )
        .unwrap();
        db
    }

    #[test]
    fn test_history_csv() {
        let db = sample_db();
        let mut buf = Vec::new();
        write_history(&mut buf, &db, "Testland", 1, 10).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("country,date,confirmed"));
        assert_eq!(lines[1], "Testland,2020-01-02,5,0,0,4,0,0");
        assert_eq!(lines[2], "Testland,2020-01-03,3,0,0,0,0,0");
    }

    #[test]
    fn test_countries_names_only() {
        let db = sample_db();
        let mut buf = Vec::new();
        write_countries(&mut buf, &db, true).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Alphaland\nTestland\n");
    }

    #[test]
    fn test_countries_json() {
        let db = sample_db();
        let mut buf = Vec::new();
        write_countries(&mut buf, &db, false).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[1]["country"], "Testland");
        assert_eq!(value[1]["last_date"], "2020-01-03");
        assert_eq!(value[1]["records"], 3);
    }
}
