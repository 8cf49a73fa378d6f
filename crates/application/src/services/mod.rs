//! Application services - Use case implementations

mod calendar_service;

pub use calendar_service::{CalendarSelection, CalendarService};
