use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Cumulative counts for one country on one day.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct CumulativeCounts {
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

impl CumulativeCounts {
    pub fn new(confirmed: u64, deaths: u64, recovered: u64) -> Self {
        Self {
            confirmed,
            deaths,
            recovered,
        }
    }

    /// Build counts from raw values that may be missing or negative.
    ///
    /// Missing and negative values are coerced to zero so they never reach
    /// a delta computation.
    pub fn coerce(confirmed: Option<i64>, deaths: Option<i64>, recovered: Option<i64>) -> Self {
        let clean = |v: Option<i64>| v.filter(|x| *x > 0).map(|x| x as u64).unwrap_or(0);
        Self {
            confirmed: clean(confirmed),
            deaths: clean(deaths),
            recovered: clean(recovered),
        }
    }
}

/// Day-over-day increases derived from consecutive cumulative counts.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct NewCounts {
    pub new_cases: u64,
    pub new_deaths: u64,
    pub new_recovered: u64,
}

/// One stored row: a country's cumulative and derived counts for a date.
///
/// For a fixed country, records are unique per date and ordered by date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyRecord {
    pub country: String,
    pub date: NaiveDate,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
    pub new_cases: u64,
    pub new_deaths: u64,
    pub new_recovered: u64,
}

impl DailyRecord {
    pub fn new(country: &str, date: NaiveDate, cumulative: CumulativeCounts, new: NewCounts) -> Self {
        Self {
            country: country.to_string(),
            date,
            confirmed: cumulative.confirmed,
            deaths: cumulative.deaths,
            recovered: cumulative.recovered,
            new_cases: new.new_cases,
            new_deaths: new.new_deaths,
            new_recovered: new.new_recovered,
        }
    }

    pub fn cumulative(&self) -> CumulativeCounts {
        CumulativeCounts::new(self.confirmed, self.deaths, self.recovered)
    }

    pub fn new_counts(&self) -> NewCounts {
        NewCounts {
            new_cases: self.new_cases,
            new_deaths: self.new_deaths,
            new_recovered: self.new_recovered,
        }
    }
}

impl Ord for DailyRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.country
            .cmp(&other.country)
            .then_with(|| self.date.cmp(&other.date))
    }
}

impl PartialOrd for DailyRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
