//! Call timestamp parsing and day arithmetic
//!
//! Timestamps are compared as naive date-times. Inputs carrying a UTC offset
//! are normalised to UTC first so mixed-offset logs still order correctly.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const NANOS_PER_DAY: f64 = 86_400_000_000_000.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Date-time layouts accepted without an offset (`%.f` also matches no fraction)
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

/// Layouts carrying an explicit offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a call timestamp
///
/// Returns `None` when the text matches none of the accepted layouts.
///
/// # Example
/// ```
/// use rellamar::timestamp::parse_timestamp;
///
/// let a = parse_timestamp("2024-03-01T12:00:00Z").unwrap();
/// let b = parse_timestamp("2024-03-01 13:00:00+01:00").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.naive_utc());
        }
    }

    let without_zulu = text.strip_suffix('Z').unwrap_or(text);
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(without_zulu, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Elapsed time from `start` to `end` in fractional days
pub fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let delta = end.signed_duration_since(start);
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_DAY,
        None => delta.num_milliseconds() as f64 / MILLIS_PER_DAY,
    }
}

/// ISO-8601 rendering used by every output format
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}
