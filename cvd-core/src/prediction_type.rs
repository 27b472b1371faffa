use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The cumulative metric a forecast is requested for.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionType {
    Cases,
    Deaths,
    Recovered,
}

impl PredictionType {
    pub const ALL: [PredictionType; 3] = [
        PredictionType::Cases,
        PredictionType::Deaths,
        PredictionType::Recovered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionType::Cases => "cases",
            PredictionType::Deaths => "deaths",
            PredictionType::Recovered => "recovered",
        }
    }
}

impl fmt::Display for PredictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cases" => Ok(PredictionType::Cases),
            "deaths" => Ok(PredictionType::Deaths),
            "recovered" => Ok(PredictionType::Recovered),
            other => Err(format!(
                "unknown prediction_type '{}', expected one of cases, deaths, recovered",
                other
            )),
        }
    }
}
