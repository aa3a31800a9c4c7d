// src/timeline/dates.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%SZ"];

/// Parse a bare calendar date as printed in vendor tables and catalogs.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse an API timestamp (`2024-03-12T18:05:51.123Z` and friends) to its UTC date.
pub fn parse_timestamp_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().date());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}
