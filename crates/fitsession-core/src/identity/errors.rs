use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of identity provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityErrorKind {
    /// Password does not match the account
    WrongCredentials,
    /// No account for the given email
    UserNotFound,
    EmailExists,
    WeakPassword,
    InvalidEmail,
    UserDisabled,
    /// Provider is throttling this client
    TooManyAttempts,
    /// Connection failure or request timeout
    Network,
    /// Response body could not be parsed
    Parse,
    Unclassified,
}

impl IdentityErrorKind {
    /// Maps a structured provider error code (e.g. `EMAIL_NOT_FOUND`).
    pub fn from_code(code: &str) -> Option<Self> {
        let kind = match code.trim() {
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => Self::WrongCredentials,
            "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "EMAIL_EXISTS" => Self::EmailExists,
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            code if code.starts_with("WEAK_PASSWORD") => Self::WeakPassword,
            _ => return None,
        };
        Some(kind)
    }

    /// Legacy classification by substring of a human-readable message.
    ///
    /// Only the two markers emitted by client SDKs are recognized.
    pub fn from_message(message: &str) -> Self {
        if message.contains("wrong-password") {
            Self::WrongCredentials
        } else if message.contains("user-not-found") {
            Self::UserNotFound
        } else {
            Self::Unclassified
        }
    }
}

impl fmt::Display for IdentityErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IdentityErrorKind::WrongCredentials => "wrong_credentials",
            IdentityErrorKind::UserNotFound => "user_not_found",
            IdentityErrorKind::EmailExists => "email_exists",
            IdentityErrorKind::WeakPassword => "weak_password",
            IdentityErrorKind::InvalidEmail => "invalid_email",
            IdentityErrorKind::UserDisabled => "user_disabled",
            IdentityErrorKind::TooManyAttempts => "too_many_attempts",
            IdentityErrorKind::Network => "network",
            IdentityErrorKind::Parse => "parse",
            IdentityErrorKind::Unclassified => "unclassified",
        };
        f.write_str(label)
    }
}

/// Structured error from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityError {
    pub kind: IdentityErrorKind,
    /// One-line summary suitable for logs
    pub message: String,
    /// Optional raw detail (e.g. response body)
    pub details: Option<String>,
}

impl IdentityError {
    pub fn new(kind: IdentityErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Builds an error from an opaque message, classifying by substring.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(IdentityErrorKind::from_message(&message), message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(IdentityErrorKind::Network, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(IdentityErrorKind::Parse, message)
    }

    /// Creates an error from a non-success HTTP response.
    ///
    /// Identity Toolkit bodies look like
    /// `{"error": {"code": 400, "message": "EMAIL_NOT_FOUND"}}`; the message may
    /// carry a trailing `" : detail"`.
    pub fn http_status(status: u16, body: &str) -> Self {
        let details = (!body.is_empty()).then(|| body.to_string());

        let provider_message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                json.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });

        let Some(provider_message) = provider_message else {
            return Self {
                kind: IdentityErrorKind::from_message(body),
                message: format!("HTTP {status}"),
                details,
            };
        };

        let code = provider_message
            .split_once(" : ")
            .map_or(provider_message.as_str(), |(code, _)| code);
        let kind = IdentityErrorKind::from_code(code)
            .unwrap_or_else(|| IdentityErrorKind::from_message(&provider_message));

        Self {
            kind,
            message: format!("HTTP {status}: {provider_message}"),
            details,
        }
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdentityError {}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::parse(format!("Failed to parse provider response: {err}"))
        } else if err.is_timeout() {
            Self::network(format!("Request to identity provider timed out: {err}"))
        } else {
            Self::network(format!("Request to identity provider failed: {err}"))
        }
    }
}
