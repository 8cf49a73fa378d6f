//! iCalendar (RFC 5545) building, parsing and patching
//!
//! Parsing goes through the `icalendar` crate. Building and patching work on
//! content lines so that properties this client does not model (alarms,
//! attendees, vendor extensions) survive an update untouched.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use domain::{Event, NewEvent, NewTodo, Priority, Todo, TodoStatus, local_midnight};
use icalendar::{
    CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, EventLike, parser,
};
use tracing::debug;

use crate::client::CalDavError;

/// PRODID written into every object this client creates
pub const PRODID: &str = "-//yacal//Yandex Calendar CLI//EN";

const MAX_LINE_OCTETS: usize = 75;

/// Escape a TEXT value
#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            },
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_text`]
#[must_use]
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Fold a content line at 75 octets without splitting a UTF-8 sequence
///
/// Continuation lines start with a single space. The result has no trailing
/// line break.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut used = 0;
    let mut limit = MAX_LINE_OCTETS;
    for c in line.chars() {
        let width = c.len_utf8();
        if used + width > limit {
            out.push_str("\r\n ");
            used = 0;
            // the leading space counts against the next line
            limit = MAX_LINE_OCTETS - 1;
        }
        out.push(c);
        used += width;
    }
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold_line(line));
    out.push_str("\r\n");
}

/// Format an instant as an iCalendar UTC DATE-TIME
#[must_use]
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Build a VCALENDAR holding one VEVENT
#[must_use]
pub fn build_vevent(uid: &str, event: &NewEvent, now: DateTime<Utc>) -> String {
    let stamp = format_utc(now);
    let mut ical = String::new();
    push_line(&mut ical, "BEGIN:VCALENDAR");
    push_line(&mut ical, "VERSION:2.0");
    push_line(&mut ical, &format!("PRODID:{PRODID}"));
    push_line(&mut ical, "BEGIN:VEVENT");
    push_line(&mut ical, &format!("UID:{uid}"));
    push_line(&mut ical, &format!("DTSTAMP:{stamp}"));
    push_line(&mut ical, &format!("CREATED:{stamp}"));
    push_line(&mut ical, &format!("LAST-MODIFIED:{stamp}"));
    push_line(&mut ical, &format!("DTSTART:{}", format_utc(event.start)));
    push_line(&mut ical, &format!("DTEND:{}", format_utc(event.end)));
    push_line(&mut ical, &format!("SUMMARY:{}", escape_text(&event.title)));

    if let Some(description) = &event.description {
        push_line(&mut ical, &format!("DESCRIPTION:{}", escape_text(description)));
    }
    if let Some(location) = &event.location {
        push_line(&mut ical, &format!("LOCATION:{}", escape_text(location)));
    }
    if let Some(rrule) = &event.rrule {
        let rrule = rrule.trim();
        let rrule = rrule.strip_prefix("RRULE:").unwrap_or(rrule);
        push_line(&mut ical, &format!("RRULE:{rrule}"));
    }
    if let Some(minutes) = event.reminder_minutes {
        push_line(&mut ical, "BEGIN:VALARM");
        push_line(&mut ical, "ACTION:DISPLAY");
        push_line(&mut ical, &format!("DESCRIPTION:{}", escape_text(&event.title)));
        push_line(&mut ical, &format!("TRIGGER:-PT{minutes}M"));
        push_line(&mut ical, "END:VALARM");
    }

    push_line(&mut ical, "END:VEVENT");
    push_line(&mut ical, "END:VCALENDAR");
    ical
}

/// Build a VCALENDAR holding one VTODO
#[must_use]
pub fn build_vtodo(uid: &str, todo: &NewTodo, now: DateTime<Utc>) -> String {
    let stamp = format_utc(now);
    let mut ical = String::new();
    push_line(&mut ical, "BEGIN:VCALENDAR");
    push_line(&mut ical, "VERSION:2.0");
    push_line(&mut ical, &format!("PRODID:{PRODID}"));
    push_line(&mut ical, "BEGIN:VTODO");
    push_line(&mut ical, &format!("UID:{uid}"));
    push_line(&mut ical, &format!("DTSTAMP:{stamp}"));
    push_line(&mut ical, &format!("CREATED:{stamp}"));
    push_line(&mut ical, &format!("LAST-MODIFIED:{stamp}"));
    push_line(&mut ical, &format!("SUMMARY:{}", escape_text(&todo.title)));

    if let Some(description) = &todo.description {
        push_line(&mut ical, &format!("DESCRIPTION:{}", escape_text(description)));
    }
    if !todo.tags.is_empty() {
        let tags: Vec<String> = todo.tags.iter().map(|t| escape_text(t)).collect();
        push_line(&mut ical, &format!("CATEGORIES:{}", tags.join(",")));
    }
    push_line(&mut ical, &format!("PRIORITY:{}", todo.priority.value()));
    push_line(
        &mut ical,
        &format!("STATUS:{}", TodoStatus::NeedsAction.to_ical()),
    );
    if let Some(due) = todo.due {
        push_line(&mut ical, &format!("DUE:{}", format_utc(due)));
    }

    push_line(&mut ical, "END:VTODO");
    push_line(&mut ical, "END:VCALENDAR");
    ical
}

fn read_components(ical_data: &str) -> Result<Vec<CalendarComponent>, CalDavError> {
    let unfolded = parser::unfold(ical_data);
    let parsed = parser::read_calendar(&unfolded)
        .map_err(|e| CalDavError::ParseError(format!("iCalendar parse error: {e}")))?;
    Ok(parsed
        .components
        .into_iter()
        .map(CalendarComponent::from)
        .collect())
}

/// Parse every VEVENT in an iCalendar object
pub fn parse_events(ical_data: &str) -> Result<Vec<Event>, CalDavError> {
    let triggers = alarm_triggers(ical_data, "VEVENT");
    let mut events = Vec::new();

    for component in read_components(ical_data)? {
        let CalendarComponent::Event(event) = component else {
            continue;
        };
        let Some(uid) = event.get_uid().map(ToString::to_string) else {
            debug!("Skipping VEVENT without UID");
            continue;
        };
        let Some((start, all_day)) = event.get_start().and_then(resolve_date_perhaps_time) else {
            debug!(uid = %uid, "Skipping VEVENT without usable DTSTART");
            continue;
        };
        let end = event
            .get_end()
            .and_then(resolve_date_perhaps_time)
            .map(|(end, _)| end);

        let reminder_minutes = triggers
            .iter()
            .find(|(owner, _)| owner == &uid)
            .and_then(|(_, trigger)| parse_trigger_minutes(trigger));

        events.push(Event {
            title: event.get_summary().map(unescape_text).unwrap_or_default(),
            description: event.get_description().map(unescape_text),
            location: event.get_location().map(unescape_text),
            rrule: event.property_value("RRULE").map(ToString::to_string),
            created: event.property_value("CREATED").and_then(parse_datetime_value),
            last_modified: event
                .property_value("LAST-MODIFIED")
                .and_then(parse_datetime_value),
            uid,
            start,
            end,
            all_day,
            reminder_minutes,
        });
    }

    Ok(events)
}

/// Parse every VTODO in an iCalendar object
pub fn parse_todos(ical_data: &str) -> Result<Vec<Todo>, CalDavError> {
    let mut todos = Vec::new();

    for component in read_components(ical_data)? {
        let CalendarComponent::Todo(todo) = component else {
            continue;
        };
        let Some(uid) = todo.get_uid().map(ToString::to_string) else {
            debug!("Skipping VTODO without UID");
            continue;
        };

        let priority = todo
            .property_value("PRIORITY")
            .and_then(|p| p.trim().parse::<u8>().ok())
            .map(Priority::from_ical)
            .unwrap_or_default();

        let status = todo
            .property_value("STATUS")
            .map(TodoStatus::from_ical)
            .unwrap_or_default();

        let tags = todo
            .property_value("CATEGORIES")
            .map(split_categories)
            .unwrap_or_default();

        todos.push(Todo {
            title: todo.get_summary().map(unescape_text).unwrap_or_default(),
            description: todo.get_description().map(unescape_text),
            due: todo.property_value("DUE").and_then(parse_datetime_value),
            created: todo.property_value("CREATED").and_then(parse_datetime_value),
            completed_at: todo
                .property_value("COMPLETED")
                .and_then(parse_datetime_value),
            uid,
            tags,
            priority,
            status,
        });
    }

    Ok(todos)
}

/// Read the SEQUENCE of the first component of a kind
pub fn sequence_of(ical_data: &str, kind: &str) -> u32 {
    component_property(ical_data, kind, "SEQUENCE")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Split CATEGORIES on unescaped commas
fn split_categories(value: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            tags.push(unescape_text(current.trim()));
            current.clear();
        } else {
            current.push(c);
        }
    }
    tags.push(unescape_text(current.trim()));
    tags.retain(|t| !t.is_empty());
    tags
}

/// Convert DTSTART/DTEND to UTC; the flag marks a `VALUE=DATE`
fn resolve_date_perhaps_time(value: DatePerhapsTime) -> Option<(DateTime<Utc>, bool)> {
    match value {
        DatePerhapsTime::Date(date) => local_midnight(date, &Local).ok().map(|dt| (dt, true)),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some((dt, false)),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            resolve_in(&Local, naive).map(|dt| (dt, false))
        },
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let resolved = match tzid.parse::<chrono_tz::Tz>() {
                Ok(tz) => resolve_in(&tz, date_time),
                Err(_) => {
                    debug!(tzid = %tzid, "Unknown TZID, treating time as local");
                    resolve_in(&Local, date_time)
                },
            };
            resolved.map(|dt| (dt, false))
        },
    }
}

fn resolve_in<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a DATE or DATE-TIME value (UTC, floating or date-only)
pub(crate) fn parse_datetime_value(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S") {
        return resolve_in(&Local, dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
        return local_midnight(date, &Local).ok();
    }
    None
}

/// Minutes before start for a relative TRIGGER such as `-PT15M` or `-P1DT2H`
///
/// Triggers after the start or relative to the end are not reminders and
/// yield `None`.
#[must_use]
pub fn parse_trigger_minutes(trigger: &str) -> Option<u32> {
    let (params, value) = match trigger.split_once(':') {
        Some((params, value)) => (params.to_ascii_uppercase(), value),
        None => (String::new(), trigger),
    };
    if params.contains("RELATED=END") || params.contains("VALUE=DATE-TIME") {
        return None;
    }

    let duration = value.trim().strip_prefix('-')?;
    let duration = duration.strip_prefix('P')?;

    let mut minutes: u32 = 0;
    let mut number = String::new();
    let mut in_time = false;
    for c in duration.chars() {
        match c {
            '0'..='9' => number.push(c),
            'T' => in_time = true,
            unit => {
                let n: u32 = number.parse().ok()?;
                number.clear();
                let factor = match (unit, in_time) {
                    ('W', false) => 7 * 24 * 60,
                    ('D', false) => 24 * 60,
                    ('H', true) => 60,
                    ('M', true) => 1,
                    ('S', true) => 0,
                    _ => return None,
                };
                minutes = minutes.checked_add(n.checked_mul(factor)?)?;
            },
        }
    }
    if !number.is_empty() {
        return None;
    }
    Some(minutes)
}

/// First alarm TRIGGER of every component of a kind, keyed by UID
///
/// The raw content line after the property name is kept, parameters
/// included, e.g. `;RELATED=START:-PT15M` or `:-PT15M`.
fn alarm_triggers(ical_data: &str, kind: &str) -> Vec<(String, String)> {
    let unfolded = parser::unfold(ical_data);
    let begin = format!("BEGIN:{kind}");
    let end = format!("END:{kind}");

    let mut out = Vec::new();
    let mut in_component = false;
    let mut depth = 0usize;
    let mut uid: Option<String> = None;
    let mut trigger: Option<String> = None;

    for line in unfolded.lines().map(|l| l.trim_end_matches('\r')) {
        if !in_component {
            if line.eq_ignore_ascii_case(&begin) {
                in_component = true;
                depth = 0;
                uid = None;
                trigger = None;
            }
            continue;
        }
        if depth == 0 && line.eq_ignore_ascii_case(&end) {
            in_component = false;
            if let (Some(uid), Some(trigger)) = (uid.take(), trigger.take()) {
                out.push((uid, trigger));
            }
            continue;
        }
        if starts_with_ignore_case(line, "BEGIN:") {
            depth += 1;
        } else if starts_with_ignore_case(line, "END:") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && property_name(line).eq_ignore_ascii_case("UID") {
            uid = line.split_once(':').map(|(_, v)| v.to_string());
        } else if depth > 0
            && trigger.is_none()
            && property_name(line).eq_ignore_ascii_case("TRIGGER")
        {
            trigger = Some(line["TRIGGER".len()..].to_string());
        }
    }
    out
}

fn component_property(ical_data: &str, kind: &str, name: &str) -> Option<String> {
    let unfolded = parser::unfold(ical_data);
    let begin = format!("BEGIN:{kind}");
    let mut in_component = false;
    let mut depth = 0usize;

    for line in unfolded.lines().map(|l| l.trim_end_matches('\r')) {
        if !in_component {
            in_component = line.eq_ignore_ascii_case(&begin);
            continue;
        }
        if starts_with_ignore_case(line, "BEGIN:") {
            depth += 1;
        } else if starts_with_ignore_case(line, "END:") {
            if depth == 0 {
                return None;
            }
            depth -= 1;
        } else if depth == 0 && property_name(line).eq_ignore_ascii_case(name) {
            return line.split_once(':').map(|(_, v)| v.to_string());
        }
    }
    None
}

fn property_name(line: &str) -> &str {
    let end = line.find([':', ';']).unwrap_or(line.len());
    &line[..end]
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len()
        && line.is_char_boundary(prefix.len())
        && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Replacement for one property of a component
///
/// `line: None` removes the property; `Some` replaces every occurrence with
/// one new content line (added if absent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPatch {
    pub name: &'static str,
    pub line: Option<String>,
}

impl PropertyPatch {
    /// Replace `name` with `name:value`
    #[must_use]
    pub fn set(name: &'static str, value: impl AsRef<str>) -> Self {
        Self {
            name,
            line: Some(format!("{name}:{}", value.as_ref())),
        }
    }

    /// Remove `name`
    #[must_use]
    pub const fn remove(name: &'static str) -> Self {
        Self { name, line: None }
    }
}

/// Apply patches to the first component of `kind`, keeping everything else
///
/// Nested components (VALARM) and sibling components (VTIMEZONE, recurrence
/// overrides) are copied as they are. The result uses CRLF line breaks and
/// folded lines.
pub fn patch_component(
    ical_data: &str,
    kind: &str,
    patches: &[PropertyPatch],
) -> Result<String, CalDavError> {
    let unfolded = parser::unfold(ical_data);
    let begin = format!("BEGIN:{kind}");
    let end = format!("END:{kind}");

    let mut out = String::with_capacity(unfolded.len() + 256);
    let mut state = PatchState::Before;
    let mut depth = 0usize;

    for line in unfolded.lines().map(|l| l.trim_end_matches('\r')) {
        if line.is_empty() {
            continue;
        }
        match state {
            PatchState::Before if line.eq_ignore_ascii_case(&begin) => {
                state = PatchState::Inside;
                depth = 0;
            },
            PatchState::Inside if depth == 0 && line.eq_ignore_ascii_case(&end) => {
                for patch in patches {
                    if let Some(new_line) = &patch.line {
                        push_line(&mut out, new_line);
                    }
                }
                state = PatchState::Done;
            },
            PatchState::Inside => {
                if starts_with_ignore_case(line, "BEGIN:") {
                    depth += 1;
                } else if starts_with_ignore_case(line, "END:") {
                    depth = depth.saturating_sub(1);
                } else if depth == 0 {
                    let name = property_name(line);
                    if patches.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
                        continue;
                    }
                }
            },
            _ => {},
        }
        push_line(&mut out, line);
    }

    if state == PatchState::Done {
        Ok(out)
    } else {
        Err(CalDavError::ParseError(format!(
            "stored object has no complete {kind} component"
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatchState {
    Before,
    Inside,
    Done,
}
