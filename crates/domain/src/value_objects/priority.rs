//! Todo priority value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// Todo priority on the iCalendar PRIORITY scale
///
/// RFC 5545 specifies 1 as highest and 9 as lowest; 0 means undefined
/// and is normalized to [`Priority::DEFAULT`] on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

/// Coarse priority bucket used for human-readable output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityLevel {
    /// 1-3
    High,
    /// 4-6
    Medium,
    /// 7-9
    Low,
}

impl Priority {
    /// Highest priority
    pub const HIGHEST: Self = Self(1);
    /// Lowest priority
    pub const LOWEST: Self = Self(9);
    /// Priority used when none is given
    pub const DEFAULT: Self = Self(5);

    /// Create a priority, rejecting values outside 1..=9
    pub const fn new(value: u8) -> Result<Self, DomainError> {
        match value {
            1..=9 => Ok(Self(value)),
            _ => Err(DomainError::InvalidPriority(value)),
        }
    }

    /// Read an iCalendar PRIORITY value leniently
    ///
    /// 0 (undefined) and out-of-range values fall back to the default.
    #[must_use]
    pub const fn from_ical(value: u8) -> Self {
        match value {
            1..=9 => Self(value),
            _ => Self::DEFAULT,
        }
    }

    /// Raw iCalendar value
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Bucket for display
    #[must_use]
    pub const fn level(self) -> PriorityLevel {
        match self.0 {
            1..=3 => PriorityLevel::High,
            4..=6 => PriorityLevel::Medium,
            _ => PriorityLevel::Low,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PriorityLevel {
    /// Get a human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.level().label())
    }
}

impl TryFrom<u8> for Priority {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Smaller iCal number is more important and sorts first
        other.0.cmp(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_range() {
        for value in 1..=9 {
            assert_eq!(Priority::new(value).map(Priority::value).ok(), Some(value));
        }
    }

    #[test]
    fn rejects_zero_and_ten() {
        assert!(matches!(
            Priority::new(0),
            Err(DomainError::InvalidPriority(0))
        ));
        assert!(matches!(
            Priority::new(10),
            Err(DomainError::InvalidPriority(10))
        ));
    }

    #[test]
    fn from_ical_normalizes_undefined() {
        assert_eq!(Priority::from_ical(0), Priority::DEFAULT);
        assert_eq!(Priority::from_ical(42), Priority::DEFAULT);
        assert_eq!(Priority::from_ical(2).value(), 2);
    }

    #[test]
    fn levels() {
        assert_eq!(Priority::HIGHEST.level(), PriorityLevel::High);
        assert_eq!(Priority::DEFAULT.level(), PriorityLevel::Medium);
        assert_eq!(Priority::LOWEST.level(), PriorityLevel::Low);
    }

    #[test]
    fn ordering_puts_highest_first() {
        let mut priorities = vec![Priority::LOWEST, Priority::HIGHEST, Priority::DEFAULT];
        priorities.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            priorities,
            vec![Priority::HIGHEST, Priority::DEFAULT, Priority::LOWEST]
        );
    }

    #[test]
    fn serializes_as_number() {
        let json = serde_json::to_string(&Priority::HIGHEST).expect("serialize");
        assert_eq!(json, "1");
        let parsed: Result<Priority, _> = serde_json::from_str("11");
        assert!(parsed.is_err());
    }

    #[test]
    fn display_includes_level() {
        assert_eq!(Priority::HIGHEST.to_string(), "1 (high)");
    }
}
