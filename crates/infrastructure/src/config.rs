//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then a TOML file,
//! then `YACAL_*` environment variables (`__` separates nesting levels, e.g.
//! `YACAL_CALDAV__SERVER_URL`). Command-line flags are applied on top by the
//! CLI.

use std::{fmt, path::Path};

use integration_caldav::{CalDavConfig, YANDEX_CALDAV_URL};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "yacal";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "YACAL";

/// How command results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Human-readable lines
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid output format: {s}. Use 'json' or 'text'")),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// CalDAV server configuration
    #[serde(default)]
    pub caldav: CalDavAppConfig,

    /// Calendar selection
    #[serde(default)]
    pub calendar: CalendarAppConfig,

    /// Output rendering
    #[serde(default)]
    pub output: OutputConfig,
}

/// CalDAV server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalDavAppConfig {
    /// CalDAV server URL (default: Yandex Calendar)
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Calendar home collection; discovered from the principal when unset
    #[serde(default)]
    pub calendar_home: Option<String>,

    /// Verify TLS certificates (default: true)
    #[serde(default = "default_true")]
    pub verify_certs: bool,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_caldav_timeout")]
    pub timeout_secs: u64,
}

impl Default for CalDavAppConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            calendar_home: None,
            verify_certs: true,
            timeout_secs: default_caldav_timeout(),
        }
    }
}

fn default_server_url() -> String {
    YANDEX_CALDAV_URL.to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_caldav_timeout() -> u64 {
    30
}

impl CalDavAppConfig {
    /// Convert to `integration_caldav`'s `CalDavConfig`
    #[must_use]
    pub fn to_caldav_config(&self) -> CalDavConfig {
        CalDavConfig {
            server_url: self.server_url.clone(),
            calendar_home: self.calendar_home.clone(),
            verify_certs: self.verify_certs,
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Which calendars commands act on when `--calendar` is not given
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarAppConfig {
    /// Display name of the calendar for event commands
    #[serde(default)]
    pub default_calendar: Option<String>,

    /// Display name of the calendar for todo commands
    #[serde(default)]
    pub todo_calendar: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl AppConfig {
    /// Load configuration from defaults, a file and the process environment
    ///
    /// An explicit `path` must exist; otherwise `yacal.toml` in the working
    /// directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(
        path: Option<&Path>,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            // Start with defaults
            .set_default("caldav.server_url", YANDEX_CALDAV_URL)?
            .set_default("caldav.verify_certs", true)?
            .set_default("caldav.timeout_secs", default_caldav_timeout())?
            .set_default("output.format", OutputFormat::default().to_string())?
            .add_source(file)
            // Override with environment variables (e.g., YACAL_CALDAV__TIMEOUT_SECS)
            .add_source(env);

        let config = builder.build()?;
        config.try_deserialize()
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
