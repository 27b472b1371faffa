//! Shared utility functions for CVD crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, NaiveDateTime};

    /// Storage and wire format for dates: "YYYY-MM-DD"
    pub const ISO_FORMAT: &str = "%Y-%m-%d";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(ISO_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), ISO_FORMAT)?)
    }

    /// Parse a date as found in source CSV files.
    ///
    /// Accepts "YYYY-MM-DD", "YYYY-MM-DD HH:MM:SS", "YYYY-MM-DDTHH:MM:SS"
    /// and the compact "YYYYMMDD". Any time component is dropped.
    pub fn parse_date_lenient(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        if let Ok(d) = NaiveDate::parse_from_str(s, ISO_FORMAT) {
            return Some(d);
        }
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }
        NaiveDate::parse_from_str(s, "%Y%m%d").ok()
    }

}

/// Numeric coercion for loosely typed CSV fields
pub mod numbers {
    /// Parse a count field, returning `None` for anything non-numeric.
    ///
    /// Integral floats such as "12.0" are accepted; fractional values are
    /// truncated toward zero. Empty, "nan" and non-finite values are `None`.
    pub fn parse_count(s: &str) -> Option<i64> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(v) = s.parse::<i64>() {
            return Some(v);
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v.trunc() as i64),
            _ => None,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_count() {
            assert_eq!(parse_count("42"), Some(42));
            assert_eq!(parse_count(" 7 "), Some(7));
            assert_eq!(parse_count("12.0"), Some(12));
            assert_eq!(parse_count("-3"), Some(-3));
            assert_eq!(parse_count(""), None);
            assert_eq!(parse_count("NaN"), None);
            assert_eq!(parse_count("n/a"), None);
            assert_eq!(parse_count("inf"), None);
        }
    }
}
