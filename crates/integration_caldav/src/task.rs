//! CalDAV task (VTODO) support
//!
//! Todo operations on top of [`HttpCalDavClient`]. Yandex keeps todos in
//! separate collections from events, so every call takes the todo calendar.

use async_trait::async_trait;
use chrono::Utc;
use domain::{NewTodo, Todo, TodoCompletion, TodoStatus};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::client::{
    CalDavError, HttpCalDavClient, Precondition, StoredItem, calendar_query_body,
};
use crate::ical::{self, PropertyPatch};

/// CalDAV task client trait
#[async_trait]
pub trait CalDavTaskClient: Send + Sync {
    /// List all todos from a calendar
    async fn list_todos(&self, calendar: &str) -> Result<Vec<Todo>, CalDavError>;

    /// Look up one todo by UID
    async fn find_todo(&self, calendar: &str, uid: &str) -> Result<StoredItem<Todo>, CalDavError>;

    /// Create a new todo with a fresh UID
    async fn create_todo(&self, calendar: &str, todo: &NewTodo) -> Result<Todo, CalDavError>;

    /// Mark a todo completed; a completed todo is left untouched
    async fn complete_todo(&self, calendar: &str, uid: &str)
    -> Result<TodoCompletion, CalDavError>;

    /// Delete a todo
    async fn delete_todo(&self, calendar: &str, uid: &str) -> Result<(), CalDavError>;
}

#[async_trait]
impl CalDavTaskClient for HttpCalDavClient {
    #[instrument(skip(self))]
    async fn list_todos(&self, calendar: &str) -> Result<Vec<Todo>, CalDavError> {
        let responses = self
            .calendar_query(calendar, calendar_query_body("VTODO", None, None))
            .await?;

        let todos: Vec<Todo> = self
            .collect_items(responses, ical::parse_todos)
            .into_iter()
            .map(|stored| stored.item)
            .collect();

        debug!(count = todos.len(), "Listed todos");
        Ok(todos)
    }

    #[instrument(skip(self))]
    async fn find_todo(&self, calendar: &str, uid: &str) -> Result<StoredItem<Todo>, CalDavError> {
        let responses = self
            .calendar_query(calendar, calendar_query_body("VTODO", None, Some(uid)))
            .await?;

        self.collect_items(responses, ical::parse_todos)
            .into_iter()
            .find(|stored| stored.item.uid == uid)
            .ok_or_else(|| CalDavError::TodoNotFound(uid.to_string()))
    }

    #[instrument(skip(self, todo), fields(title = %todo.title))]
    async fn create_todo(&self, calendar: &str, todo: &NewTodo) -> Result<Todo, CalDavError> {
        let uid = Uuid::new_v4().to_string();
        let now = Utc::now();
        let url = self.resource_url(calendar, &uid);
        let body = ical::build_vtodo(&uid, todo, now);

        self.put_resource(&url, body, Precondition::Absent, || {
            CalDavError::CalendarNotFound(calendar.to_string())
        })
        .await?;

        debug!(uid = %uid, "Todo created successfully");
        Ok(Todo {
            uid,
            title: todo.title.clone(),
            description: todo.description.clone(),
            tags: todo.tags.clone(),
            priority: todo.priority,
            status: TodoStatus::NeedsAction,
            due: todo.due,
            created: Some(now),
            completed_at: None,
        })
    }

    #[instrument(skip(self))]
    async fn complete_todo(
        &self,
        calendar: &str,
        uid: &str,
    ) -> Result<TodoCompletion, CalDavError> {
        let stored = self.find_todo(calendar, uid).await?;
        if stored.item.is_completed() {
            debug!(uid = %uid, "Todo already completed, nothing to write");
            return Ok(TodoCompletion {
                todo: stored.item,
                changed: false,
            });
        }

        let now = Utc::now();
        let stamp = ical::format_utc(now);
        let sequence = ical::sequence_of(&stored.raw, "VTODO") + 1;
        let patches = [
            PropertyPatch::set("STATUS", TodoStatus::Completed.to_ical()),
            PropertyPatch::set("COMPLETED", &stamp),
            PropertyPatch::set("PERCENT-COMPLETE", "100"),
            PropertyPatch::set("DTSTAMP", &stamp),
            PropertyPatch::set("LAST-MODIFIED", &stamp),
            PropertyPatch::set("SEQUENCE", sequence.to_string()),
        ];
        let body = ical::patch_component(&stored.raw, "VTODO", &patches)?;

        self.put_resource(
            &stored.href,
            body,
            Precondition::Matches(stored.etag.as_deref()),
            || CalDavError::TodoNotFound(uid.to_string()),
        )
        .await?;

        debug!(uid = %uid, "Todo completed successfully");
        Ok(TodoCompletion {
            todo: Todo {
                status: TodoStatus::Completed,
                completed_at: Some(now),
                ..stored.item
            },
            changed: true,
        })
    }

    #[instrument(skip(self))]
    async fn delete_todo(&self, calendar: &str, uid: &str) -> Result<(), CalDavError> {
        let stored = self.find_todo(calendar, uid).await?;
        self.delete_resource(&stored.href, stored.etag.as_deref(), || {
            CalDavError::TodoNotFound(uid.to_string())
        })
        .await?;

        debug!(uid = %uid, "Todo deleted successfully");
        Ok(())
    }
}
