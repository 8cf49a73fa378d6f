//! Application layer - Use cases and orchestration
//!
//! Contains the calendar use cases, port definitions and the error taxonomy
//! that decides exit codes. Orchestrates domain objects and infrastructure
//! adapters.

pub mod date_window;
pub mod error;
pub mod ports;
pub mod services;

pub use date_window::{RangeSelector, event_times};
pub use error::{ApplicationError, ErrorKind};
pub use ports::*;
pub use services::*;
