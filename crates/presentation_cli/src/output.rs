//! Result rendering
//!
//! JSON is the stable, scriptable form. Text is for people: one line per item,
//! times in the local time zone.

use std::fmt::Write as _;

use application::ApplicationError;
use chrono::{DateTime, Local, Utc};
use domain::{CalendarRef, Event, Todo, TodoCompletion};
use infrastructure::OutputFormat;
use serde::Serialize;

/// Outcome of a delete or completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
}

impl StatusReport {
    #[must_use]
    pub fn deleted(uid: impl Into<String>) -> Self {
        Self {
            status: "deleted",
            uid: uid.into(),
            changed: None,
        }
    }

    #[must_use]
    pub fn completed(completion: &TodoCompletion) -> Self {
        Self {
            status: "completed",
            uid: completion.todo.uid.clone(),
            changed: Some(completion.changed),
        }
    }
}

/// Anything a subcommand can print
#[derive(Debug, Clone)]
pub enum CommandOutput {
    Calendars(Vec<CalendarRef>),
    Events(Vec<Event>),
    Event(Event),
    Todos(Vec<Todo>),
    Todo(Todo),
    Status(StatusReport),
}

/// Todo with the derived completion flag
#[derive(Serialize)]
struct TodoView<'a> {
    #[serde(flatten)]
    todo: &'a Todo,
    completed: bool,
}

impl<'a> From<&'a Todo> for TodoView<'a> {
    fn from(todo: &'a Todo) -> Self {
        Self {
            todo,
            completed: todo.is_completed(),
        }
    }
}

impl CommandOutput {
    /// Render for stdout
    pub fn render(&self, format: OutputFormat) -> Result<String, ApplicationError> {
        match format {
            OutputFormat::Json => self.to_json(),
            OutputFormat::Text => Ok(self.to_text()),
        }
    }

    fn to_json(&self) -> Result<String, ApplicationError> {
        let rendered = match self {
            Self::Calendars(calendars) => serde_json::to_string_pretty(calendars),
            Self::Events(events) => serde_json::to_string_pretty(events),
            Self::Event(event) => serde_json::to_string_pretty(event),
            Self::Todos(todos) => {
                let views: Vec<TodoView<'_>> = todos.iter().map(TodoView::from).collect();
                serde_json::to_string_pretty(&views)
            },
            Self::Todo(todo) => serde_json::to_string_pretty(&TodoView::from(todo)),
            Self::Status(report) => serde_json::to_string_pretty(report),
        };
        rendered.map_err(|e| ApplicationError::Server(format!("cannot encode output: {e}")))
    }

    fn to_text(&self) -> String {
        match self {
            Self::Calendars(calendars) => lines(calendars, calendar_line, "No calendars"),
            Self::Events(events) => lines(events, event_line, "No events"),
            Self::Event(event) => event_details(event),
            Self::Todos(todos) => lines(todos, todo_line, "No todos"),
            Self::Todo(todo) => todo_line(todo),
            Self::Status(report) => match report.changed {
                Some(false) => format!("{} already {}", report.uid, report.status),
                _ => format!("{} {}", report.status, report.uid),
            },
        }
    }
}

fn lines<T>(items: &[T], line: fn(&T) -> String, empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items.iter().map(line).collect::<Vec<_>>().join("\n")
}

fn calendar_line(calendar: &CalendarRef) -> String {
    let kinds = match (calendar.supports_events, calendar.supports_todos) {
        (true, true) => "events, todos",
        (true, false) => "events",
        (false, true) => "todos",
        (false, false) => "-",
    };
    format!("{}  [{kinds}]  {}", calendar.name, calendar.href)
}

fn local(instant: DateTime<Utc>, all_day: bool) -> String {
    let local = instant.with_timezone(&Local);
    if all_day {
        local.format("%Y-%m-%d").to_string()
    } else {
        local.format("%Y-%m-%d %H:%M").to_string()
    }
}

fn event_line(event: &Event) -> String {
    let mut line = local(event.start, event.all_day);
    if let Some(end) = event.end {
        let _ = write!(line, " - {}", local(end, event.all_day));
    }
    let _ = write!(line, "  {}", event.title);
    if let Some(location) = &event.location {
        let _ = write!(line, " @ {location}");
    }
    let _ = write!(line, "  ({})", event.uid);
    line
}

fn event_details(event: &Event) -> String {
    let mut text = event_line(event);
    if let Some(description) = &event.description {
        let _ = write!(text, "\n  {description}");
    }
    if let Some(rrule) = &event.rrule {
        let _ = write!(text, "\n  repeats: {rrule}");
    }
    if let Some(minutes) = event.reminder_minutes {
        let _ = write!(text, "\n  reminder: {minutes} min before");
    }
    text
}

fn todo_line(todo: &Todo) -> String {
    let mark = if todo.is_completed() { "x" } else { " " };
    let mut line = format!("[{mark}] {}  (priority {}", todo.title, todo.priority.value());
    if let Some(due) = todo.due {
        let _ = write!(line, ", due {}", local(due, false));
    }
    line.push(')');
    if !todo.tags.is_empty() {
        let _ = write!(line, "  #{}", todo.tags.join(" #"));
    }
    let _ = write!(line, "  ({})", todo.uid);
    line
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use domain::{Priority, TodoStatus};

    use super::*;

    fn todo(status: TodoStatus) -> Todo {
        Todo {
            uid: "todo-1".to_string(),
            title: "Buy milk".to_string(),
            description: None,
            tags: vec!["home".to_string(), "errands".to_string()],
            priority: Priority::new(3).unwrap(),
            status,
            due: None,
            created: None,
            completed_at: None,
        }
    }

    fn event() -> Event {
        Event {
            uid: "ev-1".to_string(),
            title: "Planning".to_string(),
            start: Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap(),
            end: Some(Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap()),
            all_day: false,
            description: None,
            location: Some("Room 4".to_string()),
            rrule: None,
            reminder_minutes: Some(15),
            created: None,
            last_modified: None,
        }
    }

    #[test]
    fn deleted_status_json() {
        let json = CommandOutput::Status(StatusReport::deleted("ev-1"))
            .render(OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::json!({"status": "deleted", "uid": "ev-1"}));
    }

    #[test]
    fn completed_status_json_reports_change() {
        let completion = TodoCompletion {
            todo: todo(TodoStatus::Completed),
            changed: false,
        };
        let json = CommandOutput::Status(StatusReport::completed(&completion))
            .render(OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "completed", "uid": "todo-1", "changed": false})
        );
    }

    #[test]
    fn todo_json_carries_completed_flag() {
        let json = CommandOutput::Todos(vec![todo(TodoStatus::NeedsAction)])
            .render(OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["completed"], false);
        assert_eq!(value[0]["priority"], 3);
        assert_eq!(value[0]["status"], "NEEDS-ACTION");
        assert_eq!(value[0]["tags"][1], "errands");
    }

    #[test]
    fn event_json_uses_rfc3339_times() {
        let json = CommandOutput::Event(event()).render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["uid"], "ev-1");
        assert_eq!(value["start"], "2026-03-10T09:00:00Z");
        assert_eq!(value["reminder_minutes"], 15);
    }

    #[test]
    fn text_lists_are_one_line_per_item() {
        let text = CommandOutput::Events(vec![event(), event()])
            .render(OutputFormat::Text)
            .unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Planning @ Room 4  (ev-1)"));
    }

    #[test]
    fn text_for_empty_lists() {
        let text = CommandOutput::Todos(Vec::new())
            .render(OutputFormat::Text)
            .unwrap();
        assert_eq!(text, "No todos");
    }

    #[test]
    fn text_todo_line() {
        let text = CommandOutput::Todo(todo(TodoStatus::Completed))
            .render(OutputFormat::Text)
            .unwrap();
        assert_eq!(text, "[x] Buy milk  (priority 3)  #home #errands  (todo-1)");
    }

    #[test]
    fn text_for_repeated_completion() {
        let completion = TodoCompletion {
            todo: todo(TodoStatus::Completed),
            changed: false,
        };
        let text = CommandOutput::Status(StatusReport::completed(&completion))
            .render(OutputFormat::Text)
            .unwrap();
        assert_eq!(text, "todo-1 already completed");
    }
}
