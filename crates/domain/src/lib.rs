//! Domain layer for yacal
//!
//! Contains the calendar entities, value objects, input parsing and domain
//! errors. This layer performs no I/O.

pub mod date_input;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use date_input::parse_datetime_in;
pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
