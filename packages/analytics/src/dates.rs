//! Date and time-of-day parsing for bucket keys.
//!
//! Offence dates are stored as text, normally `YYYY-MM-DD`, and times as
//! `HH:MM` or `HH:MM:SS`. These helpers extract the pieces the bucketing
//! and month-range filtering need without ever failing loudly: a `None`
//! tells the caller to skip the record.

use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime, Utc};

/// Returns the second `-`-separated component of a date string, e.g.
/// `"01"` for `"2023-01-15"`.
#[must_use]
pub fn month_key(date: &str) -> Option<&str> {
    date.split('-').nth(1)
}

/// Parses a month key into a month number in `1..=12`.
#[must_use]
pub fn parse_month(key: &str) -> Option<u32> {
    key.trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
}

/// Month number of a `YYYY-MM-DD` date string.
#[must_use]
pub fn month_number(date: &str) -> Option<u32> {
    month_key(date).and_then(parse_month)
}

/// Hour of day from the leading `HH` of a time string.
///
/// Returns `None` unless the first `:`-separated segment is an integer in
/// `0..=23`.
#[must_use]
pub fn hour_of_day(time: &str) -> Option<u32> {
    time.split(':')
        .next()?
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|h| *h < 24)
}

/// Parses an offence date and truncates it to its UTC calendar date.
///
/// Accepts a bare `YYYY-MM-DD`, an RFC 3339 timestamp (converted to UTC
/// first), or a naive `YYYY-MM-DD[T ]HH:MM:SS[.f]` timestamp taken as UTC.
#[must_use]
pub fn parse_utc_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.date());
        }
    }
    None
}

/// Week of the year: `ceil((days since January 1 + 1) / 7)`.
///
/// January 1 through 7 are week 1 whatever weekday the year starts on, so
/// December 31 lands in week 53.
#[must_use]
pub fn week_of_year(date: NaiveDate) -> u32 {
    (date.ordinal0() + 1).div_ceil(7)
}
