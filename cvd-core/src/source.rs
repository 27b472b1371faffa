use crate::DailyRecord;

/// Read-only access to stored daily records.
///
/// Implementations return one country's records ordered ascending by date.
/// The forecasting core never writes through this trait.
pub trait HistoricalSource {
    fn country_records(&self, country: &str) -> anyhow::Result<Vec<DailyRecord>>;
}

impl HistoricalSource for [DailyRecord] {
    fn country_records(&self, country: &str) -> anyhow::Result<Vec<DailyRecord>> {
        let mut records: Vec<DailyRecord> = self
            .iter()
            .filter(|r| r.country == country)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.date);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CumulativeCounts, NewCounts};
    use chrono::NaiveDate;

    #[test]
    fn slice_source_filters_and_orders() {
        let rec = |country: &str, d: u32| {
            DailyRecord::new(
                country,
                NaiveDate::from_ymd_opt(2020, 1, d).unwrap(),
                CumulativeCounts::default(),
                NewCounts::default(),
            )
        };
        let records = vec![rec("Testland", 2), rec("Arcadia", 1), rec("Testland", 1)];
        let found = records.as_slice().country_records("Testland").unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].date < found[1].date);
        assert!(records.as_slice().country_records("Nowhere").unwrap().is_empty());
    }
}
