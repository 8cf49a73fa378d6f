//! Calendar collection reference

use serde::Serialize;

/// A calendar collection as advertised by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarRef {
    /// Display name
    pub name: String,
    /// Collection URL (absolute)
    pub href: String,
    /// Accepts VEVENT components
    pub supports_events: bool,
    /// Accepts VTODO components
    pub supports_todos: bool,
}

impl CalendarRef {
    /// Check whether this looks like the todo list
    ///
    /// Yandex keeps todos in a collection whose path contains `todos`, and not
    /// every server advertises `supported-calendar-component-set`.
    #[must_use]
    pub fn is_todo_list(&self) -> bool {
        self.href.contains("todos")
    }

    /// Case-insensitive display name comparison
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}
