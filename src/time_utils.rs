// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Seconds elapsed between an RFC3339 instant and `now`, clamped at zero.
///
/// An unparseable start time yields 0 rather than an error; the trip record
/// stays usable even if the stored timestamp was mangled.
pub fn elapsed_secs(start_rfc3339: &str, now: DateTime<Utc>) -> u64 {
    DateTime::parse_from_rfc3339(start_rfc3339)
        .map(|start| (now - start.with_timezone(&Utc)).num_seconds().max(0) as u64)
        .unwrap_or(0)
}

/// Calendar date (UTC) of an RFC3339 instant, if it parses.
pub fn date_of(rfc3339: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
}

/// Format a duration in seconds as `HH:MM:SS`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
