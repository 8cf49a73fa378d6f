//! Application-level errors

use std::fmt;

use domain::DomainError;
use thiserror::Error;

/// Failure category reported to the user and mapped to the exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Auth,
    Network,
    NotFound,
    Conflict,
    Server,
    Config,
}

impl ErrorKind {
    /// Process exit code for this kind
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Server | Self::Config => 1,
            Self::Validation => 2,
            Self::Auth => 3,
            Self::Network => 4,
            Self::NotFound => 5,
            Self::Conflict => 6,
        }
    }

    /// Name used in `error[<kind>]` diagnostics
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Auth => "AuthError",
            Self::Network => "NetworkError",
            Self::NotFound => "NotFoundError",
            Self::Conflict => "ConflictError",
            Self::Server => "ServerError",
            Self::Config => "ConfigError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Input rejected before any request was made
    #[error("{0}")]
    Validation(String),

    /// Credentials missing or rejected by the server
    #[error("{0}")]
    Auth(String),

    /// Host unreachable, timeout or transport failure
    #[error("{0}")]
    Network(String),

    /// Unknown uid or calendar
    #[error("{0}")]
    NotFound(String),

    /// The server refused the write
    #[error("{0}")]
    Conflict(String),

    /// Unexpected status or unparsable response
    #[error("{0}")]
    Server(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Category of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(DomainError::MissingCredentials(_)) | Self::Auth(_) => ErrorKind::Auth,
            Self::Domain(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Server(_) => ErrorKind::Server,
            Self::Configuration(_) => ErrorKind::Config,
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}
