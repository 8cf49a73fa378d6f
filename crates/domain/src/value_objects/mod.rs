//! Value Objects - Immutable, identity-less domain primitives

mod credentials;
mod date_range;
mod priority;
mod search_query;
mod todo_status;

pub use credentials::{AuthMethod, Credentials};
pub use date_range::{DateRange, local_midnight};
pub use priority::{Priority, PriorityLevel};
pub use search_query::{SearchFields, SearchQuery};
pub use todo_status::TodoStatus;
