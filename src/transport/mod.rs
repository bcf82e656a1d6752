//! Transport layer for talking to the ExpenseVista API
//!
//! [`HttpTransport`] is the seam between the credential logic and the wire.
//! The production implementation is [`ReqwestTransport`]; tests substitute
//! scripted transports to control timing and responses.

pub mod http;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};
use crate::types::AccessToken;

pub use http::ReqwestTransport;

/// Transport trait for executing API calls
///
/// Implementations send the request exactly as given. Status codes are
/// reported in [`ApiResponse`] and never turned into errors here; only
/// network-level failures produce `Err`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one call
    ///
    /// # Errors
    /// Returns error if the call could not be delivered or timed out
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        (**self).execute(request).await
    }
}

// ============================================================================
// Request
// ============================================================================

/// A replayable API call
///
/// The body is held as JSON so the call can be re-sent unchanged after the
/// credential is renewed.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    credential: Option<AccessToken>,
    retried: bool,
}

impl ApiRequest {
    /// Create a request with no body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            credential: None,
            retried: false,
        }
    }

    /// GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// PUT request
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// DELETE request
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    /// Returns error if the body cannot be serialized
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// HTTP method
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the base URL
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// JSON body, if any
    #[must_use]
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Credential attached as a bearer token, if any
    #[must_use]
    pub fn credential(&self) -> Option<&AccessToken> {
        self.credential.as_ref()
    }

    /// Whether this call has already been replayed once after renewal
    #[must_use]
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Value of the `Authorization` header, if a credential is attached
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.credential.as_ref().map(AccessToken::bearer)
    }

    pub(crate) fn with_credential(mut self, credential: Option<AccessToken>) -> Self {
        self.credential = credential;
        self
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

// ============================================================================
// Response
// ============================================================================

/// Raw API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Bytes,
}

impl ApiResponse {
    /// Create a response
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Response carrying a JSON value, mostly useful for scripted transports
    #[must_use]
    pub fn json_value(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    /// HTTP status
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw body bytes
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response, returning the body bytes
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Whether the status is the authorization failure status
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Convert a non-success status into an error.
    ///
    /// An authorization failure that reaches this point is one that was not
    /// (or could no longer be) recovered, so it maps to
    /// `ClientError::Unauthorized`.
    ///
    /// # Errors
    /// Returns `ClientError::Unauthorized` or `ClientError::Status`
    pub fn error_for_status(self, path: &str) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else if self.is_unauthorized() {
            Err(ClientError::unauthorized(path))
        } else {
            Err(ClientError::status(self.status, path, &self.body))
        }
    }

    /// Decode the body as JSON.
    ///
    /// `204 No Content` and `205 Reset Content` decode from `null`, so `()`
    /// and `Option<T>` work for empty responses.
    ///
    /// # Errors
    /// Returns `ClientError::JsonDecode` if the body does not match `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.is_empty()
            || self.status == StatusCode::NO_CONTENT
            || self.status == StatusCode::RESET_CONTENT
        {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}
