//! CalDAV calendar adapter - Implements `CalendarPort` and `TodoPort` using
//! `integration_caldav`

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::{CalendarPort, TodoPort};
use async_trait::async_trait;
use domain::{
    CalendarRef, Credentials, DateRange, Event, EventUpdate, NewEvent, NewTodo, Todo,
    TodoCompletion,
};
use integration_caldav::{CalDavClient, CalDavError, CalDavTaskClient, HttpCalDavClient};
use tracing::{debug, instrument};

use crate::config::CalDavAppConfig;

/// Adapter for calendar, event and todo operations over CalDAV
pub struct CalDavCalendarAdapter<C> {
    client: Arc<C>,
}

impl<C> std::fmt::Debug for CalDavCalendarAdapter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalDavCalendarAdapter").finish_non_exhaustive()
    }
}

impl<C> Clone for CalDavCalendarAdapter<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C> CalDavCalendarAdapter<C> {
    /// Wrap an existing CalDAV client
    pub const fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

impl CalDavCalendarAdapter<HttpCalDavClient> {
    /// Build an HTTP CalDAV client from configuration
    ///
    /// No request is made until a port method is called.
    pub fn connect(
        config: &CalDavAppConfig,
        credentials: Credentials,
    ) -> Result<Self, ApplicationError> {
        let client = HttpCalDavClient::new(config.to_caldav_config(), credentials)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        debug!(server = %config.server_url, "CalDAV client ready");
        Ok(Self::new(Arc::new(client)))
    }
}

/// Map CalDAV error to application error
pub(crate) fn map_error(err: CalDavError) -> ApplicationError {
    match err {
        CalDavError::ConnectionFailed(e) => ApplicationError::Network(e),
        CalDavError::Timeout => ApplicationError::Network("CalDAV request timed out".into()),
        CalDavError::AuthenticationFailed => {
            ApplicationError::Auth("CalDAV authentication failed".into())
        },
        CalDavError::UnknownAccount(e) => ApplicationError::Auth(e),
        e @ (CalDavError::CalendarNotFound(_)
        | CalDavError::EventNotFound(_)
        | CalDavError::TodoNotFound(_)) => ApplicationError::NotFound(e.to_string()),
        e @ CalDavError::Conflict(_) => ApplicationError::Conflict(e.to_string()),
        e @ (CalDavError::RequestFailed(_) | CalDavError::ParseError(_)) => {
            ApplicationError::Server(e.to_string())
        },
        CalDavError::InvalidData(e) => ApplicationError::Validation(e),
    }
}

#[async_trait]
impl<C: CalDavClient + 'static> CalendarPort for CalDavCalendarAdapter<C> {
    #[instrument(skip(self))]
    async fn list_calendars(&self) -> Result<Vec<CalendarRef>, ApplicationError> {
        self.client.list_calendars().await.map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn list_events(
        &self,
        calendar_href: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<Event>, ApplicationError> {
        let events = self
            .client
            .get_events(calendar_href, range)
            .await
            .map_err(map_error)?;
        debug!(count = events.len(), "Fetched events");
        Ok(events)
    }

    #[instrument(skip(self, event), fields(title = %event.title))]
    async fn create_event(
        &self,
        calendar_href: &str,
        event: &NewEvent,
    ) -> Result<Event, ApplicationError> {
        self.client
            .create_event(calendar_href, event)
            .await
            .map_err(map_error)
    }

    #[instrument(skip(self, update))]
    async fn update_event(
        &self,
        calendar_href: &str,
        uid: &str,
        update: &EventUpdate,
    ) -> Result<Event, ApplicationError> {
        self.client
            .update_event(calendar_href, uid, update)
            .await
            .map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, calendar_href: &str, uid: &str) -> Result<(), ApplicationError> {
        self.client
            .delete_event(calendar_href, uid)
            .await
            .map_err(map_error)
    }
}

#[async_trait]
impl<C: CalDavTaskClient + 'static> TodoPort for CalDavCalendarAdapter<C> {
    #[instrument(skip(self))]
    async fn list_todos(&self, calendar_href: &str) -> Result<Vec<Todo>, ApplicationError> {
        let todos = self
            .client
            .list_todos(calendar_href)
            .await
            .map_err(map_error)?;
        debug!(count = todos.len(), "Fetched todos");
        Ok(todos)
    }

    #[instrument(skip(self, todo), fields(title = %todo.title))]
    async fn create_todo(
        &self,
        calendar_href: &str,
        todo: &NewTodo,
    ) -> Result<Todo, ApplicationError> {
        self.client
            .create_todo(calendar_href, todo)
            .await
            .map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn complete_todo(
        &self,
        calendar_href: &str,
        uid: &str,
    ) -> Result<TodoCompletion, ApplicationError> {
        self.client
            .complete_todo(calendar_href, uid)
            .await
            .map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn delete_todo(&self, calendar_href: &str, uid: &str) -> Result<(), ApplicationError> {
        self.client
            .delete_todo(calendar_href, uid)
            .await
            .map_err(map_error)
    }
}
