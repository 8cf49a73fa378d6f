//! CalDAV integration
//!
//! Client for CalDAV servers (Yandex Calendar, and any server speaking
//! RFC 4791): calendar discovery, event and todo queries and ETag-guarded
//! writes.

pub mod client;
pub mod ical;
pub mod task;
pub mod xml;

pub use client::{
    CalDavClient, CalDavConfig, CalDavError, HttpCalDavClient, StoredItem, YANDEX_CALDAV_URL,
};
pub use task::CalDavTaskClient;
