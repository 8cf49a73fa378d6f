//! Todo status value object
//!
//! Represents the current state of a VTODO in its lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Todo status indicating its current state
///
/// Based on iCalendar VTODO STATUS property (RFC 5545).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum TodoStatus {
    /// Todo needs action (not yet started)
    #[default]
    NeedsAction,
    /// Todo is in progress
    InProcess,
    /// Todo is completed
    Completed,
    /// Todo is cancelled
    Cancelled,
}

impl TodoStatus {
    /// Get a human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NeedsAction => "needs action",
            Self::InProcess => "in process",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Convert to iCalendar STATUS value
    #[must_use]
    pub const fn to_ical(&self) -> &'static str {
        match self {
            Self::NeedsAction => "NEEDS-ACTION",
            Self::InProcess => "IN-PROCESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse from iCalendar STATUS value
    ///
    /// Some servers write `IN-PROGRESS`; it is accepted as well.
    #[must_use]
    pub fn from_ical(status: &str) -> Self {
        match status.trim().to_uppercase().as_str() {
            "IN-PROCESS" | "IN-PROGRESS" => Self::InProcess,
            "COMPLETED" => Self::Completed,
            "CANCELLED" => Self::Cancelled,
            _ => Self::NeedsAction,
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
