//! Calendar event entities

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::DomainError;

/// A VEVENT as stored on the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub uid: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// DTSTART was a `VALUE=DATE`
    pub all_day: bool,
    pub description: Option<String>,
    pub location: Option<String>,
    pub rrule: Option<String>,
    /// Minutes before start of the first DISPLAY alarm
    pub reminder_minutes: Option<u32>,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Input for creating an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub rrule: Option<String>,
    pub reminder_minutes: Option<u32>,
}

impl NewEvent {
    /// Check the input before anything is sent
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_title(&self.title)?;
        validate_times(self.start, self.end)?;
        if self.reminder_minutes == Some(0) {
            return Err(DomainError::validation(
                "reminder must be at least 1 minute before the event",
            ));
        }
        if let Some(rrule) = &self.rrule {
            validate_rrule(rrule)?;
        }
        Ok(())
    }
}

/// Partial update of an event; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl EventUpdate {
    /// No field supplied
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.description.is_none()
            && self.location.is_none()
    }

    /// Checks that need no server state
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.is_empty() {
            return Err(DomainError::validation(
                "nothing to update: pass at least one of --title, --start, --end, --description, --location",
            ));
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            validate_times(start, end)?;
        }
        Ok(())
    }

    /// Merge the update into a stored event
    ///
    /// Fails when the merged times are inverted. An event without DTEND keeps
    /// its missing end unless one is supplied.
    pub fn apply_to(&self, event: &Event) -> Result<Event, DomainError> {
        let mut merged = event.clone();
        if let Some(title) = &self.title {
            merged.title.clone_from(title);
        }
        if let Some(start) = self.start {
            merged.start = start;
            merged.all_day = false;
        }
        if let Some(end) = self.end {
            merged.end = Some(end);
            merged.all_day = false;
        }
        if let Some(description) = &self.description {
            merged.description = Some(description.clone());
        }
        if let Some(location) = &self.location {
            merged.location = Some(location.clone());
        }
        if let Some(end) = merged.end {
            validate_times(merged.start, end)?;
        }
        Ok(merged)
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title must not be empty"));
    }
    Ok(())
}

const FREQUENCIES: [&str; 7] = [
    "SECONDLY", "MINUTELY", "HOURLY", "DAILY", "WEEKLY", "MONTHLY", "YEARLY",
];

/// RFC 5545 RECUR shape: `KEY=VALUE(;KEY=VALUE)*` with a valid `FREQ`
///
/// An optional `RRULE:` prefix is accepted.
fn validate_rrule(rrule: &str) -> Result<(), DomainError> {
    let rule = rrule.trim();
    let rule = rule.strip_prefix("RRULE:").unwrap_or(rule);
    if rule.is_empty() {
        return Err(DomainError::validation("rrule must not be empty"));
    }
    if rule.chars().any(char::is_control) {
        return Err(DomainError::validation(
            "rrule must not contain control characters",
        ));
    }

    let mut frequency = None;
    for part in rule.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            return Err(DomainError::validation(format!(
                "invalid rrule part '{part}' (expected KEY=VALUE)"
            )));
        };
        let key_ok = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
        let value_ok = !value.is_empty() && !value.contains([':', '=']);
        if !key_ok || !value_ok {
            return Err(DomainError::validation(format!(
                "invalid rrule part '{part}' (expected KEY=VALUE)"
            )));
        }
        if key.eq_ignore_ascii_case("FREQ") {
            frequency = Some(value);
        }
    }

    match frequency {
        Some(freq) if FREQUENCIES.iter().any(|f| f.eq_ignore_ascii_case(freq)) => Ok(()),
        Some(freq) => Err(DomainError::validation(format!(
            "unknown rrule frequency '{freq}'"
        ))),
        None => Err(DomainError::validation("rrule must contain FREQ")),
    }
}

fn validate_times(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), DomainError> {
    if start >= end {
        return Err(DomainError::validation(format!(
            "start ({}) must be before end ({})",
            start.to_rfc3339(),
            end.to_rfc3339()
        )));
    }
    Ok(())
}
