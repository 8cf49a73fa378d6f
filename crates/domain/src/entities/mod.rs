//! Domain entities - Objects with identity and lifecycle

mod calendar;
mod event;
mod todo;

pub use calendar::CalendarRef;
pub use event::{Event, EventUpdate, NewEvent};
pub use todo::{NewTodo, Todo, TodoCompletion, parse_tags};
