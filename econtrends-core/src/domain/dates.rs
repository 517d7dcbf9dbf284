//! Lenient calendar-date parsing for API timestamps and user-supplied dates.
//!
//! Accepted shapes (all resolve to a `NaiveDate`):
//! - `YYYY-MM-DD`
//! - `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD HH:MM:SS`, with optional fractional seconds
//! - RFC 3339 (`2020-01-01T00:00:00-03:00`), the date is taken in the given offset
//! - `YYYY-MM` (first day of the month)
//! - `YYYY` (January 1st)

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse a date, returning `None` for anything unrecognized.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    if let Some((year, month)) = s.split_once('-') {
        if is_digits(year, 4) && (is_digits(month, 1) || is_digits(month, 2)) {
            let year: i32 = year.parse().ok()?;
            let month: u32 = month.parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
        return None;
    }

    if is_digits(s, 4) {
        let year: i32 = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    None
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_full_dates() {
        assert_eq!(parse_date("2016-01-31"), Some(ymd(2016, 1, 31)));
        assert_eq!(parse_date("  2016-01-31 "), Some(ymd(2016, 1, 31)));
    }

    #[test]
    fn parses_month_and_year_shorthands() {
        assert_eq!(parse_date("2016-01"), Some(ymd(2016, 1, 1)));
        assert_eq!(parse_date("2016-1"), Some(ymd(2016, 1, 1)));
        assert_eq!(parse_date("2016"), Some(ymd(2016, 1, 1)));
    }

    #[test]
    fn parses_timestamps() {
        assert_eq!(parse_date("2020-03-01T00:00:00"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_date("2020-03-01T12:30:00.250"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_date("2020-03-01T00:00:00-03:00"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_date("2016-01-01 00:00:00"), Some(ymd(2016, 1, 1)));
        assert_eq!(parse_date("2016-01-01 23:59:59.5"), Some(ymd(2016, 1, 1)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("n/a"), None);
        assert_eq!(parse_date("2016-13"), None);
        assert_eq!(parse_date("2016-02-30"), None);
        assert_eq!(parse_date("16-01"), None);
        assert_eq!(parse_date("2016-01-01x"), None);
    }
}
