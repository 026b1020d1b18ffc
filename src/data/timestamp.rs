use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Formats tried in order. chrono's numeric parsing accepts unpadded
/// single-digit fields, so the loose `M/D/YYYY H:MM:SS` form is covered by
/// the month-first pattern.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y%m%dT%H%M%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Parse a timestamp string against the supported formats, most specific
/// first. Returns `None` when nothing matches.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.and_hms_opt(0, 0, 0)?);
        }
    }

    None
}

/// Day of week (Monday = 0) from the first ten characters of the timestamp
/// (`YYYY-MM-DD`). NaN when the prefix is not a date.
pub fn day_of_week(raw: &str) -> f64 {
    let prefix: String = raw.trim().chars().take(10).collect();
    match NaiveDate::parse_from_str(&prefix, "%Y-%m-%d") {
        Ok(date) => date.weekday().num_days_from_monday() as f64,
        Err(_) => f64::NAN,
    }
}
