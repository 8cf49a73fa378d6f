//! Date/time input parsing
//!
//! Accepts the formats users type on a command line and resolves them to an
//! instant. Inputs without an offset are interpreted in the given time zone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::errors::DomainError;
use crate::value_objects::local_midnight;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d.%m.%Y"];

/// Parse a date or date-time, resolving local forms in `tz`
///
/// Supported, in order:
/// - RFC 3339 with offset: `2026-02-20T12:00:00+03:00`, `...Z`
/// - `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM[:SS]`
/// - `YYYY-MM-DD`, `DD.MM.YYYY` (midnight)
/// - `now` as `now` itself
/// - `today`, `tomorrow`, `yesterday` relative to the day of `now` in `tz`
///   (midnight)
/// - free-form text understood by `fuzzydate`
pub fn parse_datetime_in<Tz: TimeZone>(
    input: &str,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDateTime("empty date".to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return resolve_local(naive, tz, trimmed);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return local_midnight(date, tz);
        }
    }

    let lowered = trimmed.to_lowercase();
    if lowered == "now" {
        return Ok(now);
    }
    let today = now.with_timezone(tz).date_naive();
    if let Some(date) = parse_relative_day(&lowered, today) {
        return local_midnight(date, tz);
    }

    match fuzzydate::parse(trimmed) {
        Ok(naive) => resolve_local(naive, tz, trimmed),
        Err(_) => Err(DomainError::InvalidDateTime(format!(
            "cannot parse '{trimmed}' (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)"
        ))),
    }
}

fn parse_relative_day(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    match input {
        "today" => Some(today),
        "tomorrow" => Some(today + Duration::days(1)),
        "yesterday" => Some(today - Duration::days(1)),
        _ => None,
    }
}

fn resolve_local<Tz: TimeZone>(
    naive: NaiveDateTime,
    tz: &Tz,
    input: &str,
) -> Result<DateTime<Utc>, DomainError> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            DomainError::InvalidDateTime(format!("'{input}' does not exist in the local time zone"))
        })
}
