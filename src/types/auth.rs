//! Authentication payloads

use serde::{Deserialize, Serialize};

use super::identifiers::AccessToken;

/// Credentials for password login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
    /// Keep the user profile across restarts
    #[serde(skip)]
    pub remember_me: bool,
}

impl LoginRequest {
    /// Create a login request that is not remembered across restarts
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    /// Set the remember-me flag
    #[must_use]
    pub fn remember(mut self, remember_me: bool) -> Self {
        self.remember_me = remember_me;
        self
    }
}

/// New account registration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Account email
    pub email: String,
    /// Chosen password
    pub password: String,
    /// Password repeated
    pub confirm_password: String,
}

/// Password reset confirmation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// Account email
    pub email: String,
    /// Reset token from the email link
    pub token: String,
    /// Replacement password
    pub new_password: String,
}

/// Signed-in user as returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User identifier
    pub id: String,
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Account email
    pub email: String,
}

impl UserProfile {
    /// First and last name joined, falling back to the email
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => self.email.clone(),
        }
    }
}

/// Token envelope inside a login response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEnvelope {
    /// Short-lived access credential
    pub access_token: AccessToken,
}

/// Raw login response.
///
/// Older API versions name the user `applicationUser`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Issued credential
    #[serde(default)]
    pub token: Option<TokenEnvelope>,
    /// Signed-in user
    #[serde(default, alias = "applicationUser")]
    pub user: Option<UserProfile>,
}

impl LoginResponse {
    /// Split into credential and user, if both are present
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        match (self.token, self.user) {
            (Some(token), Some(user)) => Some(Session {
                token: token.access_token,
                user,
            }),
            _ => None,
        }
    }
}

/// A signed-in session as produced by a successful login
#[derive(Debug, Clone)]
pub struct Session {
    /// Short-lived access credential
    pub token: AccessToken,
    /// Signed-in user
    pub user: UserProfile,
}

/// Acknowledgement body carrying an optional human-readable message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    /// Message text
    #[serde(default)]
    pub message: Option<String>,
}

/// Renewal response, either flat or wrapped like the login response
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RenewalResponse {
    /// `{ "accessToken": "..." }`
    Flat {
        /// Renewed credential
        #[serde(rename = "accessToken")]
        access_token: AccessToken,
    },
    /// `{ "token": { "accessToken": "..." } }`
    Wrapped {
        /// Renewed credential
        token: TokenEnvelope,
    },
}

impl RenewalResponse {
    /// Extract the renewed credential
    #[must_use]
    pub fn into_token(self) -> AccessToken {
        match self {
            Self::Flat { access_token } => access_token,
            Self::Wrapped { token } => token.access_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_accepts_application_user() {
        let raw = r#"{"token":{"accessToken":"abc"},"applicationUser":{"id":"1","email":"a@b.c"}}"#;
        let parsed: LoginResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.token.unwrap().access_token.as_str(), "abc");
        assert_eq!(parsed.user.unwrap().email, "a@b.c");
    }

    #[test]
    fn test_login_response_without_token_has_no_session() {
        let parsed: LoginResponse =
            serde_json::from_str(r#"{"user":{"id":"1","email":"a@b.c"}}"#).unwrap();
        assert!(parsed.into_session().is_none());
    }

    #[test]
    fn test_renewal_response_shapes() {
        let flat: RenewalResponse = serde_json::from_str(r#"{"accessToken":"T2"}"#).unwrap();
        assert_eq!(flat.into_token().as_str(), "T2");

        let wrapped: RenewalResponse =
            serde_json::from_str(r#"{"token":{"accessToken":"T3"}}"#).unwrap();
        assert_eq!(wrapped.into_token().as_str(), "T3");
    }

    #[test]
    fn test_login_request_skips_remember_flag() {
        let req = LoginRequest::new("a@b.c", "pw").remember(true);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("rememberMe").is_none());
        assert_eq!(json["email"], "a@b.c");
    }

    #[test]
    fn test_display_name() {
        let user = UserProfile {
            id: "1".into(),
            first_name: Some("Ada".into()),
            last_name: None,
            email: "ada@example.com".into(),
        };
        assert_eq!(user.display_name(), "Ada");
    }
}
