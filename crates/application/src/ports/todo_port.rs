//! Todo port
//!
//! Defines the interface for todo (VTODO) management.

use async_trait::async_trait;
use domain::{NewTodo, Todo, TodoCompletion};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for todo operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TodoPort: Send + Sync {
    /// List all todos in a todo calendar
    async fn list_todos(&self, calendar_href: &str) -> Result<Vec<Todo>, ApplicationError>;

    /// Create a new todo
    async fn create_todo(
        &self,
        calendar_href: &str,
        todo: &NewTodo,
    ) -> Result<Todo, ApplicationError>;

    /// Mark a todo completed
    ///
    /// Completing an already completed todo succeeds with `changed == false`
    /// and writes nothing.
    async fn complete_todo(
        &self,
        calendar_href: &str,
        uid: &str,
    ) -> Result<TodoCompletion, ApplicationError>;

    /// Delete a todo
    async fn delete_todo(&self, calendar_href: &str, uid: &str) -> Result<(), ApplicationError>;
}
