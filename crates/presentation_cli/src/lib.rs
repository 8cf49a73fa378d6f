//! yacal command-line client
//!
//! Argument surface, dispatch to the calendar service and result rendering.
//! The binary in `main.rs` only adds logging and the exit code.

pub mod cli;
pub mod output;
pub mod run;

pub use cli::{Cli, Command, log_filter_from_verbosity};
pub use output::{CommandOutput, StatusReport};
pub use run::{Request, credentials, execute, run};
