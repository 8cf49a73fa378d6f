//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Neither basic credentials nor an OAuth token were supplied
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Date/time parsing error
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),

    /// Range whose start lies after its end
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    /// Priority outside 1..=9
    #[error("Invalid priority: {0} (expected 1-9, 1 is highest)")]
    InvalidPriority(u8),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_range_message_names_both_ends() {
        let err = DomainError::InvalidDateRange {
            start: "2026-01-02".to_string(),
            end: "2026-01-01".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: 2026-01-02 is after 2026-01-01"
        );
    }

    #[test]
    fn invalid_priority_message() {
        let err = DomainError::InvalidPriority(12);
        assert_eq!(
            err.to_string(),
            "Invalid priority: 12 (expected 1-9, 1 is highest)"
        );
    }

    #[test]
    fn validation_helper() {
        let err = DomainError::validation("title must not be empty");
        assert!(matches!(err, DomainError::ValidationError(_)));
        assert_eq!(err.to_string(), "Validation failed: title must not be empty");
    }

    #[test]
    fn missing_credentials_message() {
        let err = DomainError::MissingCredentials("no token".to_string());
        assert_eq!(err.to_string(), "Missing credentials: no token");
    }
}
