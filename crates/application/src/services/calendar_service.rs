//! Calendar service
//!
//! Use cases behind every CLI subcommand: input validation before any I/O,
//! calendar selection, range filtering, ordering and search.

use std::{fmt, sync::Arc};

use domain::{
    CalendarRef, DateRange, Event, EventUpdate, NewEvent, NewTodo, SearchQuery, Todo,
    TodoCompletion,
};
use tracing::{debug, info, instrument};

use crate::{
    error::ApplicationError,
    ports::{CalendarPort, TodoPort},
};

/// Calendar names used when the command does not name one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarSelection {
    /// Display name of the calendar for event commands
    pub default_calendar: Option<String>,
    /// Display name of the calendar for todo commands
    pub todo_calendar: Option<String>,
}

/// Calendar service for handling calendar, event and todo operations
pub struct CalendarService {
    calendar_port: Arc<dyn CalendarPort>,
    todo_port: Arc<dyn TodoPort>,
    selection: CalendarSelection,
}

impl fmt::Debug for CalendarService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarService")
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl CalendarService {
    /// Create a new calendar service
    pub fn new(
        calendar_port: Arc<dyn CalendarPort>,
        todo_port: Arc<dyn TodoPort>,
        selection: CalendarSelection,
    ) -> Self {
        Self {
            calendar_port,
            todo_port,
            selection,
        }
    }

    /// All calendars in the account
    #[instrument(skip(self))]
    pub async fn list_calendars(&self) -> Result<Vec<CalendarRef>, ApplicationError> {
        let calendars = self.calendar_port.list_calendars().await?;
        debug!(count = calendars.len(), "Listed calendars");
        Ok(calendars)
    }

    /// Events starting in `[range.start, range.end)`, ascending by start
    #[instrument(skip(self))]
    pub async fn events(
        &self,
        calendar: Option<&str>,
        range: DateRange,
    ) -> Result<Vec<Event>, ApplicationError> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let target = self.event_calendar(calendar).await?;
        let events = self
            .calendar_port
            .list_events(&target.href, Some(range))
            .await?;

        let mut events: Vec<Event> = events
            .into_iter()
            .filter(|event| range.contains(event.start))
            .collect();
        sort_by_start(&mut events);

        info!(calendar = %target.name, count = events.len(), "Listed events");
        Ok(events)
    }

    /// Create an event after validating it
    #[instrument(skip(self, event), fields(title = %event.title))]
    pub async fn create_event(
        &self,
        calendar: Option<&str>,
        event: &NewEvent,
    ) -> Result<Event, ApplicationError> {
        event.validate()?;
        let target = self.event_calendar(calendar).await?;
        let created = self.calendar_port.create_event(&target.href, event).await?;
        info!(uid = %created.uid, calendar = %target.name, "Created event");
        Ok(created)
    }

    /// Apply a partial update to an event
    ///
    /// The adapter re-checks the merged start/end against the stored event.
    #[instrument(skip(self, update))]
    pub async fn update_event(
        &self,
        calendar: Option<&str>,
        uid: &str,
        update: &EventUpdate,
    ) -> Result<Event, ApplicationError> {
        let uid = require_uid(uid)?;
        update.validate()?;
        let target = self.event_calendar(calendar).await?;
        let updated = self
            .calendar_port
            .update_event(&target.href, uid, update)
            .await?;
        info!(uid, "Updated event");
        Ok(updated)
    }

    /// Delete an event; an unknown uid is an error
    #[instrument(skip(self))]
    pub async fn delete_event(
        &self,
        calendar: Option<&str>,
        uid: &str,
    ) -> Result<(), ApplicationError> {
        let uid = require_uid(uid)?;
        let target = self.event_calendar(calendar).await?;
        self.calendar_port.delete_event(&target.href, uid).await?;
        info!(uid, "Deleted event");
        Ok(())
    }

    /// Events whose selected text fields contain the query, ascending by start
    #[instrument(skip(self, query), fields(text = %query.text()))]
    pub async fn search(
        &self,
        calendar: Option<&str>,
        query: &SearchQuery,
    ) -> Result<Vec<Event>, ApplicationError> {
        if query.range().is_some_and(|range| range.is_empty()) {
            return Ok(Vec::new());
        }
        let target = self.event_calendar(calendar).await?;
        let events = self
            .calendar_port
            .list_events(&target.href, query.range())
            .await?;

        let mut matches: Vec<Event> = events
            .into_iter()
            .filter(|event| query.range().is_none_or(|range| range.contains(event.start)))
            .filter(|event| event_matches(query, event))
            .collect();
        sort_by_start(&mut matches);

        info!(count = matches.len(), "Search finished");
        Ok(matches)
    }

    /// All todos in the todo calendar
    #[instrument(skip(self))]
    pub async fn list_todos(&self, calendar: Option<&str>) -> Result<Vec<Todo>, ApplicationError> {
        let target = self.todo_calendar(calendar).await?;
        let todos = self.todo_port.list_todos(&target.href).await?;
        info!(calendar = %target.name, count = todos.len(), "Listed todos");
        Ok(todos)
    }

    /// Create a todo after validating it
    #[instrument(skip(self, todo), fields(title = %todo.title))]
    pub async fn create_todo(
        &self,
        calendar: Option<&str>,
        todo: &NewTodo,
    ) -> Result<Todo, ApplicationError> {
        todo.validate()?;
        let target = self.todo_calendar(calendar).await?;
        let created = self.todo_port.create_todo(&target.href, todo).await?;
        info!(uid = %created.uid, "Created todo");
        Ok(created)
    }

    /// Mark a todo completed; repeating the call changes nothing
    #[instrument(skip(self))]
    pub async fn complete_todo(
        &self,
        calendar: Option<&str>,
        uid: &str,
    ) -> Result<TodoCompletion, ApplicationError> {
        let uid = require_uid(uid)?;
        let target = self.todo_calendar(calendar).await?;
        let completion = self.todo_port.complete_todo(&target.href, uid).await?;
        info!(uid, changed = completion.changed, "Completed todo");
        Ok(completion)
    }

    /// Delete a todo; an unknown uid is an error
    #[instrument(skip(self))]
    pub async fn delete_todo(
        &self,
        calendar: Option<&str>,
        uid: &str,
    ) -> Result<(), ApplicationError> {
        let uid = require_uid(uid)?;
        let target = self.todo_calendar(calendar).await?;
        self.todo_port.delete_todo(&target.href, uid).await?;
        info!(uid, "Deleted todo");
        Ok(())
    }

    async fn event_calendar(&self, requested: Option<&str>) -> Result<CalendarRef, ApplicationError> {
        let calendars = self.calendar_port.list_calendars().await?;
        let name = requested.or(self.selection.default_calendar.as_deref());
        select_event_calendar(calendars, name)
    }

    async fn todo_calendar(&self, requested: Option<&str>) -> Result<CalendarRef, ApplicationError> {
        let calendars = self.calendar_port.list_calendars().await?;
        let name = requested.or(self.selection.todo_calendar.as_deref());
        select_todo_calendar(calendars, name)
    }
}

fn select_event_calendar(
    calendars: Vec<CalendarRef>,
    name: Option<&str>,
) -> Result<CalendarRef, ApplicationError> {
    if let Some(name) = name {
        return find_named(calendars, name);
    }
    calendars
        .into_iter()
        .find(|calendar| calendar.supports_events)
        .ok_or_else(|| ApplicationError::NotFound("no calendar supports events".to_string()))
}

fn select_todo_calendar(
    mut calendars: Vec<CalendarRef>,
    name: Option<&str>,
) -> Result<CalendarRef, ApplicationError> {
    if let Some(name) = name {
        return find_named(calendars, name);
    }
    calendars
        .iter()
        .position(|calendar| calendar.supports_todos)
        .or_else(|| calendars.iter().position(CalendarRef::is_todo_list))
        .map(|index| calendars.swap_remove(index))
        .ok_or_else(|| ApplicationError::NotFound("no todo calendar found".to_string()))
}

fn find_named(calendars: Vec<CalendarRef>, name: &str) -> Result<CalendarRef, ApplicationError> {
    debug!(name, "Selecting calendar by name");
    calendars
        .into_iter()
        .find(|calendar| calendar.is_named(name))
        .ok_or_else(|| ApplicationError::NotFound(format!("calendar not found: {name}")))
}

fn require_uid(uid: &str) -> Result<&str, ApplicationError> {
    let uid = uid.trim();
    if uid.is_empty() {
        return Err(ApplicationError::Validation("uid must not be empty".to_string()));
    }
    Ok(uid)
}

fn event_matches(query: &SearchQuery, event: &Event) -> bool {
    let fields = query.fields();
    (fields.title && query.matches_text(Some(&event.title)))
        || (fields.description && query.matches_text(event.description.as_deref()))
        || (fields.location && query.matches_text(event.location.as_deref()))
}

fn sort_by_start(events: &mut [Event]) {
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.uid.cmp(&b.uid)));
}
