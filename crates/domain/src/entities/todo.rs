//! Todo (VTODO) entities

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::DomainError;
use crate::value_objects::{Priority, TodoStatus};

/// A VTODO as stored on the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub uid: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub status: TodoStatus,
    pub due: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// The completed flag
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TodoStatus::Completed
    }
}

/// Result of marking a todo completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoCompletion {
    pub todo: Todo,
    /// `false` when the todo was already completed and nothing was written
    pub changed: bool,
}

/// Input for creating a todo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub due: Option<DateTime<Utc>>,
}

impl NewTodo {
    /// Check the input before anything is sent
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        Ok(())
    }
}

/// Split a comma-separated tag list, dropping blanks
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(status: TodoStatus) -> Todo {
        Todo {
            uid: "t1".to_string(),
            title: "Buy milk".to_string(),
            description: None,
            tags: vec![],
            priority: Priority::DEFAULT,
            status,
            due: None,
            created: None,
            completed_at: None,
        }
    }

    #[test]
    fn completed_flag_follows_status() {
        assert!(todo(TodoStatus::Completed).is_completed());
        assert!(!todo(TodoStatus::NeedsAction).is_completed());
        assert!(!todo(TodoStatus::Cancelled).is_completed());
    }

    #[test]
    fn tags_are_trimmed_and_blanks_dropped() {
        assert_eq!(parse_tags(" home, ,errands,"), vec!["home", "errands"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn blank_title_is_rejected() {
        let new = NewTodo {
            title: " ".to_string(),
            description: None,
            tags: vec![],
            priority: Priority::DEFAULT,
            due: None,
        };
        assert!(new.validate().is_err());
    }

    #[test]
    fn serializes_status_and_priority() {
        let json = serde_json::to_value(todo(TodoStatus::NeedsAction)).expect("serialize");
        assert_eq!(json["status"], "NEEDS-ACTION");
        assert_eq!(json["priority"], 5);
    }
}
