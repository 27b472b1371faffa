//! The `forecast` and `reload` commands: composition roots for the model
//! cache and forecasting service.

use chrono::NaiveDate;
use cvd_core::ForecastError;
use cvd_db::Database;
use cvd_forecast::{ForecastRequest, ForecastService, JsonModelStore, ModelCache};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

pub struct ForecastArgs {
    pub model_path: String,
    pub country: String,
    pub days: i64,
    pub prediction_type: String,
    pub reference_date: Option<NaiveDate>,
}

/// Build the forecast request, defaulting the reference date to the
/// country's latest record.
///
/// The other fields are validated before `latest_date` is consulted. A
/// country without records is [`ForecastError::NoRecords`].
pub fn resolve_request<F>(args: &ForecastArgs, latest_date: F) -> cvd_core::Result<ForecastRequest>
where
    F: FnOnce(&str) -> anyhow::Result<Option<NaiveDate>>,
{
    let mut request = ForecastRequest::new(
        &args.country,
        args.days,
        &args.prediction_type,
        args.reference_date,
    );
    if request.reference_date.is_some() {
        return Ok(request);
    }

    let (country, _, _) = request.validate_fields()?;
    let latest = latest_date(&country).map_err(|source| ForecastError::Source { source })?;
    match latest {
        Some(date) => {
            log::info!(
                "[CVD] forecast: no reference date given, using latest {} record {}",
                country,
                date
            );
            request.reference_date = Some(date);
            Ok(request)
        }
        None => Err(ForecastError::NoRecords { country }),
    }
}

fn failed(err: ForecastError, country: &str) -> anyhow::Error {
    let status = err.status_code();
    let err = anyhow::Error::new(err).context(format!("Forecast for '{}' failed", country));
    log::error!("[CVD] forecast: status {}: {:#}", status, err);
    err
}

fn open_service(model_path: &str) -> ForecastService {
    let store = JsonModelStore::new(model_path);
    ForecastService::new(Arc::new(ModelCache::new(Box::new(store))))
}

pub fn run_forecast<W: Write>(out: &mut W, db: &Database, args: &ForecastArgs) -> anyhow::Result<()> {
    let request = resolve_request(args, |country| db.query_latest_date(country))
        .map_err(|e| failed(e, &args.country))?;

    let service = open_service(&args.model_path);
    let response = service
        .forecast(db, &request)
        .map_err(|e| failed(e, &args.country))?;
    log::info!(
        "[CVD] forecast: model loaded {} time(s)",
        service.cache().load_count()
    );

    serde_json::to_writer_pretty(&mut *out, &response)?;
    writeln!(out)?;
    Ok(())
}

/// Outcome of the `reload` command.
#[derive(Debug, Serialize)]
pub struct ReloadReport {
    pub model_before: String,
    pub generation_before: u64,
    pub model_after: String,
    pub generation_after: u64,
}

/// Load the artifact, invalidate the cache and load it again, reporting the
/// model name and load generation on each side of the invalidation.
pub fn run_reload<W: Write>(out: &mut W, model_path: &str) -> anyhow::Result<()> {
    let service = open_service(model_path);

    let before = service.cache().get_or_load()?;
    let generation_before = service.cache().load_count();
    service.reload();
    let after = service.cache().get_or_load()?;

    let report = ReloadReport {
        model_before: before.name().to_string(),
        generation_before,
        model_after: after.name().to_string(),
        generation_after: service.cache().load_count(),
    };
    log::info!(
        "[CVD] reload: '{}' generation {} -> '{}' generation {}",
        report.model_before,
        report.generation_before,
        report.model_after,
        report.generation_after
    );
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const MODEL_JSON: &str = r#"{
        "name": "flat",
        "origin": "2020-01-01",
        "targets": {
            "cases": { "intercept": 100.0, "trend": 0.0, "cases_log": 0.0 }
        }
    }"#;

    fn sample_db() -> Database {
        let db = Database::new().unwrap();
        db.replace_all_from_csv(
            "country,date,cases,deaths,recovered\n\
             Testland,2020-01-01,1,0,0\n\
             Testland,2020-01-02,5,0,0\n",
        )
        .unwrap();
        db
    }

    fn model_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MODEL_JSON.as_bytes()).unwrap();
        file
    }

    fn args(model: &tempfile::NamedTempFile, country: &str, days: i64) -> ForecastArgs {
        ForecastArgs {
            model_path: model.path().to_string_lossy().into_owned(),
            country: country.to_string(),
            days,
            prediction_type: "cases".to_string(),
            reference_date: None,
        }
    }

    fn status_of(err: &anyhow::Error) -> u16 {
        err.downcast_ref::<ForecastError>().unwrap().status_code()
    }

    #[test]
    fn test_reference_date_defaults_to_latest_record() {
        let db = sample_db();
        let model = model_file();
        let request = resolve_request(&args(&model, "Testland", 3), |c| db.query_latest_date(c))
            .unwrap();
        assert_eq!(request.reference_date, NaiveDate::from_ymd_opt(2020, 1, 2));

        let mut explicit = args(&model, "Testland", 3);
        explicit.reference_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        let request = resolve_request(&explicit, |_| panic!("lookup not needed")).unwrap();
        assert_eq!(request.reference_date, explicit.reference_date);
    }

    #[test]
    fn test_invalid_fields_rejected_before_lookup() {
        let model = model_file();
        let mut bad_type = args(&model, "Testland", 3);
        bad_type.prediction_type = "foo".to_string();

        for a in [args(&model, "Testland", 0), args(&model, "Testland", 31), bad_type] {
            let mut looked_up = false;
            let err = resolve_request(&a, |_| {
                looked_up = true;
                Ok(None)
            })
            .unwrap_err();
            assert_eq!(err.status_code(), 422);
            assert!(!looked_up);
        }
    }

    #[test]
    fn test_lookup_failure_is_source_error() {
        let model = model_file();
        let err = resolve_request(&args(&model, "Testland", 3), |_| {
            anyhow::bail!("database closed")
        })
        .unwrap_err();
        assert!(matches!(err, ForecastError::Source { .. }));
    }

    #[test]
    fn test_run_forecast_prints_json() {
        let db = sample_db();
        let model = model_file();
        let mut buf = Vec::new();
        run_forecast(&mut buf, &db, &args(&model, "Testland", 3)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["country"], "Testland");
        assert_eq!(value["prediction_type"], "cases");
        assert_eq!(value["days"], 3);
        let predictions = value["predictions"].as_array().unwrap();
        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[0]["day"], 1);
        assert_eq!(predictions[0]["date"], "2020-01-03");
        assert_eq!(predictions[0]["predicted_value"], 100.0);
    }

    #[test]
    fn test_run_forecast_rejects_bad_horizon() {
        let db = sample_db();
        let model = model_file();
        let mut buf = Vec::new();
        let err = run_forecast(&mut buf, &db, &args(&model, "Testland", 0)).unwrap_err();
        assert_eq!(status_of(&err), 422);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_run_forecast_unknown_country_is_not_found() {
        let db = sample_db();
        let model = model_file();
        let mut buf = Vec::new();
        let err = run_forecast(&mut buf, &db, &args(&model, "Nowhere", 3)).unwrap_err();
        assert_eq!(status_of(&err), 404);
        assert!(matches!(
            err.downcast_ref::<ForecastError>(),
            Some(ForecastError::NoRecords { .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_reload_reports_generations() {
        let model = model_file();
        let mut buf = Vec::new();
        run_reload(&mut buf, &model.path().to_string_lossy()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["model_before"], "flat");
        assert_eq!(value["generation_before"], 1);
        assert_eq!(value["model_after"], "flat");
        assert_eq!(value["generation_after"], 2);
    }

    #[test]
    fn test_reload_missing_artifact_fails() {
        let mut buf = Vec::new();
        let err = run_reload(&mut buf, "/nonexistent/model.json").unwrap_err();
        assert_eq!(status_of(&err), 500);
    }
}
