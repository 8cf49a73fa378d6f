//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod caldav_calendar_adapter;

pub use caldav_calendar_adapter::CalDavCalendarAdapter;
