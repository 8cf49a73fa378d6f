//! Credentials value object
//!
//! Either HTTP Basic (username + password) or an OAuth token, plus an
//! optional account id used to locate the calendar home.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::DomainError;

/// How the client authenticates against the CalDAV server
#[derive(Clone)]
pub enum AuthMethod {
    /// HTTP Basic authentication (Yandex accepts app passwords here)
    Basic {
        username: String,
        password: SecretString,
    },
    /// `Authorization: OAuth <token>`
    OAuth { token: SecretString },
}

impl AuthMethod {
    /// Short name for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::OAuth { .. } => "oauth",
        }
    }
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::OAuth { .. } => f
                .debug_struct("OAuth")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Resolved credentials for one process run
#[derive(Debug, Clone)]
pub struct Credentials {
    auth: AuthMethod,
    user_id: Option<String>,
}

impl Credentials {
    /// Resolve credentials from optional inputs
    ///
    /// A token takes precedence over basic credentials. Empty strings count
    /// as absent so that an exported-but-empty environment variable does not
    /// shadow a real value.
    pub fn resolve(
        username: Option<String>,
        password: Option<String>,
        oauth_token: Option<String>,
        user_id: Option<String>,
    ) -> Result<Self, DomainError> {
        let username = non_empty(username);
        let password = non_empty(password);
        let user_id = non_empty(user_id);

        if let Some(token) = non_empty(oauth_token) {
            return Ok(Self {
                auth: AuthMethod::OAuth {
                    token: SecretString::from(token),
                },
                user_id,
            });
        }

        match (username, password) {
            (Some(username), Some(password)) => Ok(Self {
                auth: AuthMethod::Basic {
                    username,
                    password: SecretString::from(password),
                },
                user_id,
            }),
            (Some(_), None) => Err(DomainError::MissingCredentials(
                "username given without a password".to_string(),
            )),
            (None, Some(_)) => Err(DomainError::MissingCredentials(
                "password given without a username".to_string(),
            )),
            (None, None) => Err(DomainError::MissingCredentials(
                "provide --oauth-token or --username/--password \
                 (or YANDEX_CALENDAR_OAUTH_TOKEN / YANDEX_CALENDAR_USERNAME + \
                 YANDEX_CALENDAR_PASSWORD)"
                    .to_string(),
            )),
        }
    }

    /// Authentication method
    #[must_use]
    pub const fn auth(&self) -> &AuthMethod {
        &self.auth
    }

    /// Explicit account id, if any
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Name of the account owning the calendars
    ///
    /// The explicit user id if given, otherwise the basic-auth username.
    #[must_use]
    pub fn account_name(&self) -> Option<&str> {
        self.user_id.as_deref().or(match &self.auth {
            AuthMethod::Basic { username, .. } => Some(username.as_str()),
            AuthMethod::OAuth { .. } => None,
        })
    }

    /// Value for the `Authorization` header when not using basic auth
    #[must_use]
    pub fn oauth_header(&self) -> Option<String> {
        match &self.auth {
            AuthMethod::OAuth { token } => Some(format!("OAuth {}", token.expose_secret())),
            AuthMethod::Basic { .. } => None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
