//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use super::{ApiRequest, ApiResponse, HttpTransport};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::utils::body_for_log;

/// Production transport over `reqwest`.
///
/// The client keeps a cookie store, which carries the long-lived session
/// cookie set by the login endpoint and presented by the renewal and logout
/// endpoints. Application code never sees it.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport for the given configuration
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidConfig` if the configuration is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::invalid_config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Wrap an existing `reqwest` client
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Base URL this transport sends to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = crate::utils::join_url(&self.base_url, request.path());

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(auth) = request.authorization() {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            tracing::debug!(
                method = %request.method(),
                path = %request.path(),
                status = status.as_u16(),
                body = %body_for_log(&body),
                "API call returned non-success status"
            );
        }

        Ok(ApiResponse::new(status, body))
    }
}
