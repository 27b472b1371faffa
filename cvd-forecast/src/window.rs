//! Forecast window formatting.
//!
//! Raw model outputs become day-numbered points anchored on the request's
//! reference date rather than on today's date.

use crate::model::ModelPoint;
use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub day_offset: u32,
    pub date: NaiveDate,
    pub predicted_value: f64,
}

/// Number the outputs `1..=n` from `reference_date`.
///
/// Negative and non-finite predictions are clamped to `0`.
pub fn format_window(raw: &[ModelPoint], reference_date: NaiveDate) -> Vec<ForecastPoint> {
    raw.iter()
        .zip(1u32..)
        .map(|(point, day_offset)| ForecastPoint {
            day_offset,
            date: reference_date + TimeDelta::days(i64::from(day_offset)),
            predicted_value: clamp_prediction(point.yhat),
        })
        .collect()
}

fn clamp_prediction(v: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    fn raw(values: &[f64]) -> Vec<ModelPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| ModelPoint {
                ds: date(10) + TimeDelta::days(i as i64),
                yhat: *v,
            })
            .collect()
    }

    #[test]
    fn window_is_anchored_on_reference_date() {
        let points = format_window(&raw(&[1.0, 2.0]), date(5));
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].day_offset, 1);
        assert_eq!(points[0].date, date(6));
        assert_eq!(points[1].day_offset, 2);
        assert_eq!(points[1].date, date(7));
    }

    #[test]
    fn negative_and_non_finite_are_clamped() {
        let points = format_window(&raw(&[-3.0, f64::NAN, 4.5]), date(1));
        let values: Vec<f64> = points.iter().map(|p| p.predicted_value).collect();
        assert_eq!(values, vec![0.0, 0.0, 4.5]);
    }

    #[test]
    fn every_horizon_keeps_length_and_order() {
        for days in 1..=30usize {
            let values = vec![1.0; days];
            let points = format_window(&raw(&values), date(1));
            assert_eq!(points.len(), days);
            for (i, w) in points.windows(2).enumerate() {
                assert_eq!(w[0].day_offset as usize, i + 1);
                assert!(w[0].date < w[1].date);
            }
            assert_eq!(points[days - 1].day_offset as usize, days);
        }
    }
}
