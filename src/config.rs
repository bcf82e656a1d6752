//! Client configuration
//!
//! One base URL serves every call. Authentication endpoints live under
//! [`ClientConfig::auth_prefix`]; everything else is addressed relative to
//! the base URL directly.

use std::time::Duration;
use typed_builder::TypedBuilder;

use crate::error::{ClientError, Result};
use crate::utils::{join_url, trim_trailing_slashes};

/// Environment variable holding the API base URL
pub const ENV_API_URL: &str = "EXPENSEVISTA_API_URL";
/// Environment variable overriding the per-request timeout, in seconds
pub const ENV_REQUEST_TIMEOUT: &str = "EXPENSEVISTA_REQUEST_TIMEOUT_SECS";
/// Environment variable overriding the renewal timeout, in seconds
pub const ENV_RENEWAL_TIMEOUT: &str = "EXPENSEVISTA_RENEWAL_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "https://localhost:7000";
const DEFAULT_AUTH_PREFIX: &str = "/api/auth";

// ============================================================================
// Auth endpoints
// ============================================================================

/// Paths of the credential-free endpoints, relative to the auth prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    /// Password login
    pub login: String,
    /// Account registration
    pub register: String,
    /// Access credential renewal (long-lived cookie in, short-lived token out)
    pub refresh: String,
    /// Session revocation
    pub logout: String,
    /// Password reset request
    pub forgot_password: String,
    /// Password reset confirmation
    pub reset_password: String,
    /// Email address confirmation
    pub confirm_email: String,
    /// Re-send the confirmation email
    pub resend_confirmation: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            register: "/register".to_string(),
            refresh: "/refresh".to_string(),
            logout: "/logout".to_string(),
            forgot_password: "/forgot-password".to_string(),
            reset_password: "/reset-password".to_string(),
            confirm_email: "/confirm-email".to_string(),
            resend_confirmation: "/resend-confirmation".to_string(),
        }
    }
}

// ============================================================================
// Client configuration
// ============================================================================

/// Configuration for [`ExpenseClient`](crate::ExpenseClient) and its channels
#[derive(Debug, Clone, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for ClientConfig"),
    builder_type(doc = "Builder for ClientConfig", vis = "pub"),
    build_method(doc = "Build the ClientConfig")
)]
pub struct ClientConfig {
    /// Base URL for every outgoing call, without trailing slash
    #[builder(default = DEFAULT_BASE_URL.to_string(), setter(transform = |url: &str| trim_trailing_slashes(url).to_string()))]
    pub base_url: String,

    /// Prefix of the authentication endpoints
    #[builder(default = DEFAULT_AUTH_PREFIX.to_string(), setter(into))]
    pub auth_prefix: String,

    /// Authentication endpoint paths
    #[builder(default)]
    pub endpoints: AuthEndpoints,

    /// Timeout applied by the transport to each call
    #[builder(default = Duration::from_secs(30))]
    pub request_timeout: Duration,

    /// Timeout on the renewal call itself
    #[builder(default = Duration::from_secs(15))]
    pub renewal_timeout: Duration,

    /// Maximum number of calls allowed to wait on one renewal
    #[builder(default = 256)]
    pub max_pending_replays: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientConfig {
    /// Load configuration from the environment.
    ///
    /// Reads [`ENV_API_URL`], [`ENV_REQUEST_TIMEOUT`] and
    /// [`ENV_RENEWAL_TIMEOUT`]; anything unset keeps its default.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidConfig` if a timeout is not a whole number
    /// of seconds or the resulting configuration fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_API_URL) {
            config.base_url = trim_trailing_slashes(url.trim()).to_string();
        }
        if let Some(timeout) = read_secs(ENV_REQUEST_TIMEOUT)? {
            config.request_timeout = timeout;
        }
        if let Some(timeout) = read_secs(ENV_RENEWAL_TIMEOUT)? {
            config.renewal_timeout = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that can never work.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidConfig` for an empty or non-http(s) base
    /// URL, or a zero replay queue bound.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::invalid_config("base URL is empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::invalid_config(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.max_pending_replays == 0 {
            return Err(ClientError::invalid_config(
                "max_pending_replays must be at least 1",
            ));
        }
        Ok(())
    }

    /// Absolute URL for a request path
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Path of an auth endpoint, including the auth prefix
    #[must_use]
    pub fn auth_path(&self, endpoint: &str) -> String {
        let prefix = trim_trailing_slashes(&self.auth_prefix);
        format!("{prefix}/{}", endpoint.trim_start_matches('/'))
    }

    /// Path of the renewal endpoint
    #[must_use]
    pub fn refresh_path(&self) -> String {
        self.auth_path(&self.endpoints.refresh)
    }

    /// Path of the logout endpoint
    #[must_use]
    pub fn logout_path(&self) -> String {
        self.auth_path(&self.endpoints.logout)
    }

    /// Whether a path is the renewal or logout endpoint.
    ///
    /// Authorization failures on these never trigger recovery.
    #[must_use]
    pub fn is_session_endpoint(&self, path: &str) -> bool {
        let path = normalize(path);
        path == normalize(&self.refresh_path()) || path == normalize(&self.logout_path())
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.trim_end_matches('/')
}

fn read_secs(var: &str) -> Result<Option<Duration>> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| ClientError::invalid_config(format!("{var}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.refresh_path(), "/api/auth/refresh");
        assert_eq!(config.logout_path(), "/api/auth/logout");
        assert_eq!(config.max_pending_replays, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_trims_base_url() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:5000///")
            .build();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(
            config.url_for("/transactions"),
            "http://localhost:5000/transactions"
        );
    }

    #[test]
    fn test_session_endpoint_detection() {
        let config = ClientConfig::default();
        assert!(config.is_session_endpoint("/api/auth/refresh"));
        assert!(config.is_session_endpoint("/api/auth/logout/"));
        assert!(config.is_session_endpoint("/api/auth/refresh?x=1"));
        assert!(!config.is_session_endpoint("/api/auth/login"));
        assert!(!config.is_session_endpoint("/transactions"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ClientConfig::builder().base_url("ftp://x").build();
        assert!(matches!(
            config.validate(),
            Err(ClientError::InvalidConfig(_))
        ));

        let config = ClientConfig::builder().max_pending_replays(0).build();
        assert!(config.validate().is_err());
    }
}
