//! Command-line surface
//!
//! Every subcommand that targets one resource accepts the uid (or search
//! query) positionally or through `--uid` / `--query`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use infrastructure::OutputFormat;

/// Yandex Calendar CLI
#[derive(Debug, Parser)]
#[command(name = "yacal")]
#[command(author, version, about = "Yandex Calendar over CalDAV", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// Calendar display name (default: config, then the first event calendar)
    #[arg(long, global = true, value_name = "NAME")]
    pub calendar: Option<String>,

    /// Output format: json or text (default: config, then json)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Verbosity level (logs go to stderr)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (default: ./yacal.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Credentials; flags override the environment
#[derive(Debug, Clone, Default, Args)]
pub struct AuthArgs {
    /// Yandex login for Basic auth
    #[arg(long, global = true, env = "YANDEX_CALENDAR_USERNAME")]
    pub username: Option<String>,

    /// Password or app password for Basic auth
    #[arg(
        long,
        global = true,
        env = "YANDEX_CALENDAR_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// OAuth token (takes precedence over username/password)
    #[arg(
        long = "oauth-token",
        alias = "token",
        global = true,
        env = "YANDEX_CALENDAR_OAUTH_TOKEN",
        hide_env_values = true
    )]
    pub oauth_token: Option<String>,

    /// Account id used in the fallback calendar home path
    #[arg(long, global = true, env = "YANDEX_CALENDAR_USER_ID")]
    pub user_id: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available calendars
    ListCalendars,

    /// List events (default: the next 7 days)
    Events(EventsArgs),

    /// Create an event
    Create(CreateArgs),

    /// Update fields of an event
    Update(UpdateArgs),

    /// Delete an event
    Delete(UidArg),

    /// Search events by text
    Search(SearchArgs),

    /// List todos
    ListTodos,

    /// Create a todo
    CreateTodo(CreateTodoArgs),

    /// Mark a todo as completed
    CompleteTodo(UidArg),

    /// Delete a todo
    DeleteTodo(UidArg),
}

/// Resource uid, positional or `--uid`
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct UidArg {
    /// Resource UID
    #[arg(value_name = "UID")]
    pub uid: Option<String>,

    #[arg(long = "uid", value_name = "UID", hide = true)]
    pub uid_flag: Option<String>,
}

impl UidArg {
    /// The uid from whichever form was used
    #[must_use]
    pub fn value(&self) -> &str {
        self.uid
            .as_deref()
            .or(self.uid_flag.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Args)]
pub struct EventsArgs {
    /// Events of the current local day
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub today: bool,

    /// Range start (inclusive)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Range end (exclusive; default: start + 7 days)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Event title
    #[arg(long)]
    pub title: String,

    /// Start (default: now)
    #[arg(long, value_name = "DATETIME")]
    pub start: Option<String>,

    /// End (default: start + 1 hour)
    #[arg(long, value_name = "DATETIME")]
    pub end: Option<String>,

    /// Reminder this many minutes before the start
    #[arg(long, value_name = "MINUTES")]
    pub reminder: Option<u32>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    /// Recurrence rule, e.g. "FREQ=WEEKLY;BYDAY=WE"
    #[arg(long)]
    pub rrule: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub uid: UidArg,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, value_name = "DATETIME")]
    pub start: Option<String>,

    #[arg(long, value_name = "DATETIME")]
    pub end: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub query: QueryArg,

    /// Only events starting at or after this date
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Only events starting before this date
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Comma-separated fields to search: title, description, location
    #[arg(long = "in", value_name = "FIELDS", default_value = "title,description,location")]
    pub fields: String,
}

/// Search text, positional or `--query`
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct QueryArg {
    /// Text to look for (case-insensitive)
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    #[arg(long = "query", value_name = "QUERY", hide = true)]
    pub query_flag: Option<String>,
}

impl QueryArg {
    /// The query from whichever form was used
    #[must_use]
    pub fn value(&self) -> &str {
        self.query
            .as_deref()
            .or(self.query_flag.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Args)]
pub struct CreateTodoArgs {
    /// Todo title
    #[arg(long)]
    pub title: String,

    /// Priority from 1 (highest) to 9 (lowest)
    #[arg(long, default_value_t = 5)]
    pub priority: u8,

    /// Due date
    #[arg(long, value_name = "DATETIME")]
    pub due: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Comma-separated tags
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,
}

/// Determine log filter level from verbosity count
#[must_use]
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
