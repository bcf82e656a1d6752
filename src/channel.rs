//! Credential-bearing request pipeline
//!
//! [`AuthenticatedChannel::send`] attaches the current access credential,
//! passes every response through unchanged except an authorization failure,
//! and hands that to the [`RenewalCoordinator`] for a single transparent
//! retry. Calls to the renewal and logout endpoints, and calls that were
//! already retried once, surface their authorization failure as-is.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::{CredentialStore, RenewalCoordinator};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

/// Sends application calls with the current access credential
#[derive(Clone)]
pub struct AuthenticatedChannel {
    transport: Arc<dyn HttpTransport>,
    store: CredentialStore,
    coordinator: RenewalCoordinator,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for AuthenticatedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedChannel")
            .field("base_url", &self.config.base_url)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

impl AuthenticatedChannel {
    /// Create a channel.
    ///
    /// `store` must be the store the coordinator updates.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: CredentialStore,
        coordinator: RenewalCoordinator,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            transport,
            store,
            coordinator,
            config,
        }
    }

    /// Coordinator used for recovery
    #[must_use]
    pub fn coordinator(&self) -> &RenewalCoordinator {
        &self.coordinator
    }

    /// Send a call, renewing the credential and retrying once on an
    /// authorization failure.
    ///
    /// Non-success statuses other than a recoverable authorization failure
    /// are returned as responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns transport errors, `ClientError::SessionExpired` if renewal
    /// failed, or `ClientError::ReplayQueueFull` under overload.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut request = request.with_credential(self.store.get());
        let response = self.transport.execute(&request).await?;

        if !response.is_unauthorized() {
            return Ok(response);
        }

        if self.config.is_session_endpoint(request.path()) {
            tracing::debug!(path = %request.path(), "Authorization failure on session endpoint");
            return Ok(response);
        }

        if request.is_retried() {
            tracing::debug!(
                path = %request.path(),
                "Authorization failure after replay; not retrying again"
            );
            return Ok(response);
        }

        request.mark_retried();
        self.coordinator.recover_and_retry(request).await
    }

    // ========================================================================
    // Typed helpers
    // ========================================================================

    /// Send and decode a successful JSON body
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` for an unrecovered authorization
    /// failure, `ClientError::Status` for other failures, or a decode error.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let path = request.path().to_string();
        self.send(request).await?.error_for_status(&path)?.json()
    }

    /// Send and return the raw body of a successful response
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch), minus decoding.
    pub async fn fetch_bytes(&self, request: ApiRequest) -> Result<Bytes> {
        let path = request.path().to_string();
        Ok(self.send(request).await?.error_for_status(&path)?.into_body())
    }

    /// Send and discard the body of a successful response
    ///
    /// # Errors
    ///
    /// Same as [`fetch_bytes`](Self::fetch_bytes).
    pub async fn execute(&self, request: ApiRequest) -> Result<()> {
        self.fetch_bytes(request).await.map(|_| ())
    }

    /// `GET path` decoded as `T`
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.fetch(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body, decoded as `T`
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(ApiRequest::post(path).json(body)?).await
    }

    /// `PUT path` with a JSON body, decoded as `T`
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(ApiRequest::put(path).json(body)?).await
    }

    /// `DELETE path`
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(ApiRequest::delete(path)).await
    }
}
