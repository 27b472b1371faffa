pub mod daily_record;
pub mod date_range;
pub mod error;
pub mod prediction_type;
pub mod source;

pub use daily_record::{CumulativeCounts, DailyRecord, NewCounts};
pub use date_range::DateRange;
pub use error::{ErrorKind, ForecastError, Result};
pub use prediction_type::PredictionType;
pub use source::HistoricalSource;

/// Smallest forecast horizon, in days.
pub const MIN_HORIZON_DAYS: u32 = 1;

/// Largest forecast horizon, in days.
pub const MAX_HORIZON_DAYS: u32 = 30;
