//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer on top of the CalDAV
//! integration, and loads the application configuration.

pub mod adapters;
pub mod config;

pub use adapters::*;
pub use config::{
    AppConfig, CalDavAppConfig, CalendarAppConfig, DEFAULT_CONFIG_FILE, ENV_PREFIX, OutputConfig,
    OutputFormat,
};
