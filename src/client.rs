//! `ExpenseClient` facade
//!
//! Wires the transport, credential store, renewal coordinator and
//! session-expiry bus together and adds the session lifecycle on top:
//! login, logout, restoring a remembered session and the typed services.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      ExpenseClient                        │
//! │                                                           │
//! │  services ──→ AuthenticatedChannel ──→ HttpTransport      │
//! │                    │        ↑                             │
//! │           401      ↓        │ replay                      │
//! │              RenewalCoordinator ──→ UnauthenticatedChannel│
//! │                    │                                      │
//! │        ┌───────────┴───────────┐                          │
//! │        ↓                       ↓                          │
//! │  CredentialStore        SessionExpiryBus ──→ app handler  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use expensevista_client::{ClientConfig, ExpenseClient, LoginRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ExpenseClient::new(ClientConfig::from_env()?)?;
//!
//! client.on_session_expired(expensevista_client::FnSessionExpiryHandler::new(|event| {
//!     Box::pin(async move {
//!         eprintln!("Please sign in again: {}", event.reason);
//!     })
//! }));
//!
//! let user = client
//!     .login(&LoginRequest::new("ada@example.com", "secret").remember(true))
//!     .await?;
//! println!("Signed in as {}", user.display_name());
//!
//! let dashboard = client.dashboard().get().await?;
//! println!("Budget used: {}%", dashboard.budget.percentage_used);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::auth::{
    CredentialStore, ProfileStorage, RenewalCoordinator, SessionExpiryBus, UnauthenticatedChannel,
};
use crate::callbacks::{SessionEnded, SessionExpiryHandler, SharedSessionExpiryHandler};
use crate::channel::AuthenticatedChannel;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::services::{
    AnalyticsService, BudgetService, CategoryService, DashboardService, TopUpService,
    TransactionService, WalletService,
};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{LoginRequest, RegisterRequest, ResetPasswordRequest, UserProfile};

// ============================================================================
// Session cleanup handler
// ============================================================================

/// Always subscribed to the bus: forgets the local session, then forwards
/// to the application's handler if one is installed.
struct SessionCleanup {
    profiles: Arc<ProfileStorage>,
    user: Arc<Mutex<Option<UserProfile>>>,
    app_handler: Arc<Mutex<Option<SharedSessionExpiryHandler>>>,
}

#[async_trait]
impl SessionExpiryHandler for SessionCleanup {
    async fn on_session_expired(&self, event: SessionEnded) {
        if let Err(e) = self.profiles.clear() {
            tracing::warn!("Failed to clear stored profile: {e}");
        }
        if let Ok(mut user) = self.user.lock() {
            *user = None;
        }

        let handler = self.app_handler.lock().ok().and_then(|slot| slot.clone());
        if let Some(handler) = handler {
            handler.on_session_expired(event).await;
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for the ExpenseVista API.
///
/// Cloning yields a handle to the same session.
#[derive(Clone)]
pub struct ExpenseClient {
    config: Arc<ClientConfig>,
    store: CredentialStore,
    bus: SessionExpiryBus,
    unauthenticated: UnauthenticatedChannel,
    channel: AuthenticatedChannel,
    profiles: Arc<ProfileStorage>,
    user: Arc<Mutex<Option<UserProfile>>>,
    app_handler: Arc<Mutex<Option<SharedSessionExpiryHandler>>>,
}

impl std::fmt::Debug for ExpenseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseClient")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.is_authenticated())
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

impl ExpenseClient {
    /// Create a client over HTTP with profile storage in the platform data
    /// directory
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport, ProfileStorage::new()))
    }

    /// Create a client over a custom transport and profile storage
    #[must_use]
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        profiles: ProfileStorage,
    ) -> Self {
        let config = Arc::new(config);
        let store = CredentialStore::new();
        let bus = SessionExpiryBus::new();
        let unauthenticated = UnauthenticatedChannel::new(Arc::clone(&transport), Arc::clone(&config));
        let coordinator = RenewalCoordinator::new(
            Arc::clone(&transport),
            unauthenticated.clone(),
            store.clone(),
            bus.clone(),
            &config,
        );
        let channel =
            AuthenticatedChannel::new(transport, store.clone(), coordinator, Arc::clone(&config));

        let profiles = Arc::new(profiles);
        let user = Arc::new(Mutex::new(None));
        let app_handler = Arc::new(Mutex::new(None));

        bus.subscribe(SessionCleanup {
            profiles: Arc::clone(&profiles),
            user: Arc::clone(&user),
            app_handler: Arc::clone(&app_handler),
        });

        Self {
            config,
            store,
            bus,
            unauthenticated,
            channel,
            profiles,
            user,
            app_handler,
        }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Sign in and remember the profile according to `remember_me`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::EmailNotConfirmed` for an unverified account and
    /// `ClientError::Status` with the backend's messages for bad credentials.
    pub async fn login(&self, request: &LoginRequest) -> Result<UserProfile> {
        let session = self.unauthenticated.login(request).await?;
        self.channel
            .coordinator()
            .reset_session(Some(session.token));

        if let Err(e) = self.profiles.save(&session.user, request.remember_me) {
            tracing::warn!("Failed to store profile: {e}");
        }
        self.set_user(Some(session.user.clone()));
        self.bus.set_on_login_surface(false);

        tracing::info!(user = %session.user.id, "Signed in");
        Ok(session.user)
    }

    /// Create an account; returns the backend's acknowledgement, if any
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with the backend's validation messages.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<String>> {
        self.unauthenticated.register(request).await
    }

    /// Ask for a password reset email
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with the backend's messages.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>> {
        self.unauthenticated.forgot_password(email).await
    }

    /// Set a new password using the reset token
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with the backend's messages.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<Option<String>> {
        self.unauthenticated.reset_password(request).await
    }

    /// Confirm an email address
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with the backend's messages.
    pub async fn confirm_email(&self, user_id: &str, token: &str) -> Result<Option<String>> {
        self.unauthenticated.confirm_email(user_id, token).await
    }

    /// Re-send the confirmation email
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` with the backend's messages.
    pub async fn resend_confirmation(&self, email: &str) -> Result<Option<String>> {
        self.unauthenticated.resend_confirmation(email).await
    }

    /// Sign out.
    ///
    /// Revocation on the server is best effort. Local state is always
    /// cleared, and the session-expiry handler is not invoked. A renewal
    /// still in flight cannot bring the credential back.
    ///
    /// # Errors
    ///
    /// Returns an error only if the stored profile cannot be removed.
    pub async fn logout(&self) -> Result<()> {
        if let Err(e) = self.unauthenticated.logout().await {
            tracing::warn!("Server-side logout failed: {e}");
        }

        self.channel.coordinator().reset_session(None);
        self.set_user(None);
        self.profiles.clear()?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Resume a remembered session at startup.
    ///
    /// With a stored profile, attempts one renewal using the session cookie.
    /// Returns `Ok(true)` if the session is live again. A failed renewal goes
    /// through the usual session-expiry path; call
    /// [`set_on_login_surface`](Self::set_on_login_surface) first to keep
    /// the application handler quiet.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored profile cannot be read, or if the
    /// renewal fails for a reason other than an expired session.
    pub async fn restore_session(&self) -> Result<bool> {
        let Some(profile) = self.profiles.load()? else {
            tracing::debug!("No stored profile; nothing to restore");
            return Ok(false);
        };

        match self.channel.coordinator().renew_now().await {
            Ok(_) => {
                tracing::info!(user = %profile.id, "Session restored");
                self.set_user(Some(profile));
                Ok(true)
            }
            Err(e) if e.is_session_expired() => {
                self.profiles.clear()?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether an access credential is held
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.is_set()
    }

    /// Signed-in user, if known
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.user.lock().ok().and_then(|user| user.clone())
    }

    /// Install the application's session-expiry handler; the last one wins
    pub fn on_session_expired(&self, handler: impl SessionExpiryHandler + 'static) {
        if let Ok(mut slot) = self.app_handler.lock() {
            *slot = Some(Arc::new(handler));
        }
    }

    /// Tell the client whether the login surface is already showing
    pub fn set_on_login_surface(&self, on_login: bool) {
        self.bus.set_on_login_surface(on_login);
    }

    fn set_user(&self, profile: Option<UserProfile>) {
        if let Ok(mut user) = self.user.lock() {
            *user = profile;
        }
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Credential-bearing channel for calls the services do not cover
    #[must_use]
    pub fn channel(&self) -> &AuthenticatedChannel {
        &self.channel
    }

    /// Credential-free channel
    #[must_use]
    pub fn unauthenticated(&self) -> &UnauthenticatedChannel {
        &self.unauthenticated
    }

    /// Renewal coordinator
    #[must_use]
    pub fn coordinator(&self) -> &RenewalCoordinator {
        self.channel.coordinator()
    }

    /// Access credential store
    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.store
    }

    // ========================================================================
    // Services
    // ========================================================================

    /// Transactions
    #[must_use]
    pub fn transactions(&self) -> TransactionService<'_> {
        TransactionService::new(&self.channel)
    }

    /// Categories
    #[must_use]
    pub fn categories(&self) -> CategoryService<'_> {
        CategoryService::new(&self.channel)
    }

    /// Monthly budgets
    #[must_use]
    pub fn budgets(&self) -> BudgetService<'_> {
        BudgetService::new(&self.channel)
    }

    /// Dashboard summary
    #[must_use]
    pub fn dashboard(&self) -> DashboardService<'_> {
        DashboardService::new(&self.channel)
    }

    /// Analytics report and export
    #[must_use]
    pub fn analytics(&self) -> AnalyticsService<'_> {
        AnalyticsService::new(&self.channel)
    }

    /// Wallet and transfers
    #[must_use]
    pub fn wallet(&self) -> WalletService<'_> {
        WalletService::new(&self.channel)
    }

    /// Card top-up
    #[must_use]
    pub fn top_up(&self) -> TopUpService<'_> {
        TopUpService::new(&self.channel)
    }
}
