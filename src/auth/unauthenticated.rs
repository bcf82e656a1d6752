//! Calls that carry no bearer credential
//!
//! Login, registration and the password/email flows are plain anonymous
//! calls. Renewal and logout rely on the long-lived session cookie that the
//! transport carries ambiently; nothing in this crate reads it.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{ClientError, EMAIL_NOT_CONFIRMED, Result, backend_message};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::types::{
    AccessToken, ApiMessage, LoginRequest, LoginResponse, RegisterRequest, RenewalResponse,
    ResetPasswordRequest, Session,
};

/// Issues credential-free calls to the authentication endpoints
#[derive(Clone)]
pub struct UnauthenticatedChannel {
    transport: Arc<dyn HttpTransport>,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for UnauthenticatedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnauthenticatedChannel")
            .field("base_url", &self.config.base_url)
            .field("auth_prefix", &self.config.auth_prefix)
            .finish_non_exhaustive()
    }
}

impl UnauthenticatedChannel {
    /// Create a channel over the given transport
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, config: Arc<ClientConfig>) -> Self {
        Self { transport, config }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request with no credential attached.
    ///
    /// Any credential already on the request is stripped.
    ///
    /// # Errors
    ///
    /// Returns transport errors only; statuses are left to the caller.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let request = request.with_credential(None);
        self.transport.execute(&request).await
    }

    // ========================================================================
    // Session endpoints
    // ========================================================================

    /// Exchange the session cookie for a fresh access credential
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` if the session cookie is missing,
    /// invalid or revoked, `ClientError::Status` for other failures, and
    /// `ClientError::InvalidResponse` if no credential came back.
    pub async fn renew(&self) -> Result<AccessToken> {
        let path = self.config.refresh_path();
        tracing::debug!(path = %path, "Requesting credential renewal");

        let response = self.send(ApiRequest::post(&path)).await?;
        let response = response.error_for_status(&path)?;
        let renewed: RenewalResponse = response.json().map_err(|e| {
            ClientError::invalid_response(format!("Renewal response carried no credential: {e}"))
        })?;
        Ok(renewed.into_token())
    }

    /// Revoke the session cookie on the server.
    ///
    /// An authorization failure here means the session was already gone and
    /// is treated as success.
    ///
    /// # Errors
    ///
    /// Returns transport errors and non-authorization failure statuses.
    pub async fn logout(&self) -> Result<()> {
        let path = self.config.logout_path();
        let response = self.send(ApiRequest::post(&path)).await?;
        if response.is_unauthorized() {
            tracing::debug!(path = %path, "Logout rejected; session already ended");
            return Ok(());
        }
        response.error_for_status(&path)?;
        Ok(())
    }

    // ========================================================================
    // Account endpoints
    // ========================================================================

    /// Password login
    ///
    /// # Errors
    ///
    /// Returns `ClientError::EmailNotConfirmed` for an unverified account,
    /// `ClientError::Status` with the backend's messages for other failures,
    /// and `ClientError::InvalidResponse` if no credential or user came back.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
        let path = self.config.auth_path(&self.config.endpoints.login);
        let response = self.send(ApiRequest::post(&path).json(request)?).await?;
        let response = account_failure(response, &path)?;

        let parsed: LoginResponse = response.json()?;
        parsed
            .into_session()
            .ok_or_else(|| ClientError::invalid_response("No token received."))
    }

    /// Create an account
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with the backend's validation messages
    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<String>> {
        let path = self.config.auth_path(&self.config.endpoints.register);
        self.acknowledged(ApiRequest::post(&path).json(request)?)
            .await
    }

    /// Ask for a password reset email
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with the backend's messages
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>> {
        let path = self.config.auth_path(&self.config.endpoints.forgot_password);
        let body = serde_json::json!({ "email": email });
        self.acknowledged(ApiRequest::post(&path).json(&body)?)
            .await
    }

    /// Set a new password using the token from the reset email
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with the backend's messages
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<Option<String>> {
        let path = self.config.auth_path(&self.config.endpoints.reset_password);
        self.acknowledged(ApiRequest::post(&path).json(request)?)
            .await
    }

    /// Confirm an email address using the link parameters
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with the backend's messages
    pub async fn confirm_email(&self, user_id: &str, token: &str) -> Result<Option<String>> {
        let path = self.config.auth_path(&self.config.endpoints.confirm_email);
        let request = ApiRequest::get(&path)
            .query("userId", user_id)
            .query("token", token);
        self.acknowledged(request).await
    }

    /// Re-send the confirmation email
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with the backend's messages
    pub async fn resend_confirmation(&self, email: &str) -> Result<Option<String>> {
        let path = self
            .config
            .auth_path(&self.config.endpoints.resend_confirmation);
        let body = serde_json::json!({ "email": email });
        self.acknowledged(ApiRequest::post(&path).json(&body)?)
            .await
    }

    /// Send and return the optional acknowledgement message
    async fn acknowledged(&self, request: ApiRequest) -> Result<Option<String>> {
        let path = request.path().to_string();
        let response = self.send(request).await?;
        let response = account_failure(response, &path)?;

        // Acknowledgements may be empty or plain text
        Ok(response
            .json::<Option<ApiMessage>>()
            .ok()
            .flatten()
            .and_then(|ack| ack.message))
    }
}

/// Map a failed account-endpoint response to an error.
///
/// Unlike resource calls, a 401 here is a credential rejection with a
/// message worth showing, so it stays a `Status` error.
fn account_failure(response: ApiResponse, path: &str) -> Result<ApiResponse> {
    if response.status().is_success() {
        return Ok(response);
    }
    if backend_message(response.body()).as_deref() == Some(EMAIL_NOT_CONFIRMED) {
        return Err(ClientError::EmailNotConfirmed);
    }
    Err(ClientError::status(response.status(), path, response.body()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Returns one canned response and records what was sent
    struct Canned {
        response: ApiResponse,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl Canned {
        fn new(status: StatusCode, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                response: ApiResponse::new(status, body),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for Canned {
        async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn channel(transport: Arc<Canned>) -> UnauthenticatedChannel {
        UnauthenticatedChannel::new(transport, Arc::new(ClientConfig::default()))
    }

    #[tokio::test]
    async fn test_login_success() {
        let transport = Canned::new(
            StatusCode::OK,
            r#"{"token":{"accessToken":"T1"},"user":{"id":"u1","email":"a@b.c"}}"#,
        );
        let session = channel(transport.clone())
            .login(&LoginRequest::new("a@b.c", "pw"))
            .await
            .unwrap();
        assert_eq!(session.token.as_str(), "T1");
        assert_eq!(session.user.id, "u1");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].path(), "/api/auth/login");
        assert!(seen[0].credential().is_none());
    }

    #[tokio::test]
    async fn test_login_without_token() {
        let transport = Canned::new(StatusCode::OK, r#"{"user":{"id":"u1","email":"a@b.c"}}"#);
        let err = channel(transport)
            .login(&LoginRequest::new("a@b.c", "pw"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid response: No token received.");
    }

    #[tokio::test]
    async fn test_login_unconfirmed_email() {
        let transport = Canned::new(StatusCode::BAD_REQUEST, r#"{"message":"EMAIL_NOT_CONFIRMED"}"#);
        let err = channel(transport)
            .login(&LoginRequest::new("a@b.c", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::EmailNotConfirmed));
    }

    #[tokio::test]
    async fn test_renew_rejected_is_unauthorized() {
        let transport = Canned::new(StatusCode::UNAUTHORIZED, "");
        let err = channel(transport).renew().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized { ref path } if path == "/api/auth/refresh"));
    }

    #[tokio::test]
    async fn test_logout_tolerates_unauthorized() {
        let transport = Canned::new(StatusCode::UNAUTHORIZED, "");
        assert!(channel(transport).logout().await.is_ok());

        let transport = Canned::new(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert!(channel(transport).logout().await.is_err());
    }

    #[tokio::test]
    async fn test_register_returns_message() {
        let transport = Canned::new(StatusCode::OK, r#"{"message":"Check your inbox"}"#);
        let request = RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "pw".into(),
            confirm_password: "pw".into(),
        };
        let message = channel(transport).register(&request).await.unwrap();
        assert_eq!(message.as_deref(), Some("Check your inbox"));
    }

    #[tokio::test]
    async fn test_confirm_email_query() {
        let transport = Canned::new(StatusCode::NO_CONTENT, "");
        let message = channel(transport.clone())
            .confirm_email("u1", "tok")
            .await
            .unwrap();
        assert!(message.is_none());

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].path(), "/api/auth/confirm-email");
        assert_eq!(seen[0].query_pairs()[0], ("userId".to_string(), "u1".to_string()));
    }
}
