//! Calendar port for application layer
//!
//! Defines the interface for calendar discovery and event operations.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;
use domain::{CalendarRef, DateRange, Event, EventUpdate, NewEvent};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for calendar and event operations
///
/// Every event operation takes the href of the calendar collection it acts on.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// List the calendars in the account's calendar home
    async fn list_calendars(&self) -> Result<Vec<CalendarRef>, ApplicationError>;

    /// List events, optionally restricted by the server to a time range
    async fn list_events(
        &self,
        calendar_href: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<Event>, ApplicationError>;

    /// Create an event; the returned event carries its assigned uid
    async fn create_event(
        &self,
        calendar_href: &str,
        event: &NewEvent,
    ) -> Result<Event, ApplicationError>;

    /// Apply a partial update to the event with `uid`
    async fn update_event(
        &self,
        calendar_href: &str,
        uid: &str,
        update: &EventUpdate,
    ) -> Result<Event, ApplicationError>;

    /// Delete the event with `uid`
    async fn delete_event(&self, calendar_href: &str, uid: &str) -> Result<(), ApplicationError>;
}
