//! Error types for the ExpenseVista client

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Fallback when a failed response carries no body at all
pub const NETWORK_FALLBACK_MESSAGE: &str =
    "An unexpected network error occurred. Please try again later.";

/// Fallback when a failed response body yields no usable message
pub const GENERIC_FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

/// Backend marker for a login attempt against an unconfirmed account
pub const EMAIL_NOT_CONFIRMED: &str = "EMAIL_NOT_CONFIRMED";

/// Main error type for the ExpenseVista client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Credential renewal failed; the session cannot be recovered locally
    #[error("Session expired: {reason}")]
    SessionExpired {
        /// Why the renewal failed
        reason: String,
    },

    /// The server rejected a call that was already replayed, or an auth
    /// endpoint call, with an authorization failure
    #[error("Unauthorized: {path}")]
    Unauthorized {
        /// Path of the rejected call
        path: String,
    },

    /// Non-success status from the API
    #[error("Request to {path} failed with status {status}: {}", messages.join("; "))]
    Status {
        /// HTTP status
        status: StatusCode,
        /// Path of the failed call
        path: String,
        /// Human-readable messages extracted from the response body
        messages: Vec<String>,
    },

    /// Login attempted with an account whose email is not verified yet
    #[error("Your email is not verified.")]
    EmailNotConfirmed,

    /// Network error during API request
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// JSON decode error when parsing a response body
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// Response was well-formed JSON but missing required data
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Too many calls are already waiting on the in-flight renewal
    #[error("Replay queue full ({capacity} calls already waiting on renewal)")]
    ReplayQueueFull {
        /// Configured queue bound
        capacity: usize,
    },

    /// The renewal task went away without settling a queued call
    #[error("Queued call was dropped before renewal settled")]
    ReplayAbandoned,

    /// Profile storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Classification of authorization-related outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Authorization failure that renewal can recover from
    TransientAuthFailure,
    /// Renewal failed; the application should return to the login surface
    SessionExpired,
    /// Authorization failure that is surfaced without another retry
    RecursiveAuthFailure,
    /// Anything unrelated to authorization
    Other,
}

impl ClientError {
    /// Create a session expired error
    pub fn session_expired(reason: impl Into<String>) -> Self {
        Self::SessionExpired {
            reason: reason.into(),
        }
    }

    /// Create an unauthorized error for a call that will not be retried
    pub fn unauthorized(path: impl Into<String>) -> Self {
        Self::Unauthorized { path: path.into() }
    }

    /// Create a status error from a failed response body
    pub fn status(status: StatusCode, path: impl Into<String>, body: &[u8]) -> Self {
        Self::Status {
            status,
            path: path.into(),
            messages: extract_messages(body),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Classify this error for session handling
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::SessionExpired { .. } => ErrorClass::SessionExpired,
            Self::Unauthorized { .. } => ErrorClass::RecursiveAuthFailure,
            Self::Status { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                ErrorClass::TransientAuthFailure
            }
            _ => ErrorClass::Other,
        }
    }

    /// Whether the application should treat the user as logged out
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        self.class() == ErrorClass::SessionExpired
    }

    /// Messages suitable for showing to the user
    #[must_use]
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::Status { messages, .. } => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

// ============================================================================
// Backend error bodies
// ============================================================================

/// Field errors come either as a flat list or keyed by field name
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldErrors {
    List(Vec<String>),
    ByField(serde_json::Map<String, serde_json::Value>),
}

/// Error body shape returned by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<FieldErrors>,
}

/// Extract user-facing messages from a failed response body.
///
/// Field errors render as `"field: message"`. The global `message` goes first
/// unless it already appears. Duplicates are removed, order preserved.
#[must_use]
pub fn extract_messages(body: &[u8]) -> Vec<String> {
    if body.is_empty() {
        return vec![NETWORK_FALLBACK_MESSAGE.to_string()];
    }

    let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) else {
        return vec![GENERIC_FALLBACK_MESSAGE.to_string()];
    };

    let mut messages: Vec<String> = Vec::new();

    match parsed.errors {
        Some(FieldErrors::List(list)) => messages.extend(list),
        Some(FieldErrors::ByField(fields)) => {
            for (field, value) in fields {
                if let Some(list) = value.as_array() {
                    messages.extend(
                        list.iter()
                            .filter_map(serde_json::Value::as_str)
                            .map(|msg| format!("{field}: {msg}")),
                    );
                }
            }
        }
        None => {}
    }

    if let Some(message) = parsed.message {
        if !messages.contains(&message) {
            messages.insert(0, message);
        }
    }

    if messages.is_empty() {
        messages.push(GENERIC_FALLBACK_MESSAGE.to_string());
    }

    let mut unique = Vec::with_capacity(messages.len());
    for msg in messages {
        if !unique.contains(&msg) {
            unique.push(msg);
        }
    }
    unique
}

/// Read the top-level `message` field of an error body, if any
#[must_use]
pub fn backend_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
}
