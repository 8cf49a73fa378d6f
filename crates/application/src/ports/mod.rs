//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod calendar_port;
mod todo_port;

#[cfg(test)]
pub use calendar_port::MockCalendarPort;
pub use calendar_port::CalendarPort;
#[cfg(test)]
pub use todo_port::MockTodoPort;
pub use todo_port::TodoPort;
