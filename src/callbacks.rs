//! Trait-based callback definitions for session-expiry notification.
//!
//! The renewal machinery publishes "session ended" through a
//! [`SessionExpiryBus`](crate::auth::SessionExpiryBus); the application reacts
//! by installing a [`SessionExpiryHandler`]. Users can implement the trait on
//! their own types, wrap a closure with [`FnSessionExpiryHandler`], or receive
//! events on a tokio channel with [`ChannelSessionExpiryHandler`].
//!
//! # Example: Implementing `SessionExpiryHandler`
//!
//! ```no_run
//! use expensevista_client::callbacks::{SessionExpiryHandler, SessionEnded};
//! use async_trait::async_trait;
//!
//! struct ReturnToLogin;
//!
//! #[async_trait]
//! impl SessionExpiryHandler for ReturnToLogin {
//!     async fn on_session_expired(&self, event: SessionEnded) {
//!         println!("Logged out: {}", event.reason);
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

// ============================================================================
// Event
// ============================================================================

/// Published once per failed renewal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnded {
    /// Why the renewal failed
    pub reason: String,
}

impl SessionEnded {
    /// Create a new event
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Session Expiry Handler Trait
// ============================================================================

/// Trait for session-expiry handlers.
///
/// Called from the task that ran the failed renewal, after every waiting
/// call has already been rejected. Keep it short; spawn if the reaction
/// involves more network calls.
#[async_trait]
pub trait SessionExpiryHandler: Send + Sync {
    /// Called when the session can no longer be renewed.
    async fn on_session_expired(&self, event: SessionEnded);
}

// Blanket implementation for boxed trait objects
#[async_trait]
impl SessionExpiryHandler for Box<dyn SessionExpiryHandler> {
    async fn on_session_expired(&self, event: SessionEnded) {
        (**self).on_session_expired(event).await;
    }
}

#[async_trait]
impl<T: SessionExpiryHandler + ?Sized> SessionExpiryHandler for Arc<T> {
    async fn on_session_expired(&self, event: SessionEnded) {
        (**self).on_session_expired(event).await;
    }
}

/// Type alias for a shared session-expiry handler.
pub type SharedSessionExpiryHandler = Arc<dyn SessionExpiryHandler>;

// ============================================================================
// Closure-based handler wrapper
// ============================================================================

/// Wrapper to convert a closure into a `SessionExpiryHandler`.
///
/// # Example
///
/// ```no_run
/// use expensevista_client::callbacks::{FnSessionExpiryHandler, SharedSessionExpiryHandler};
/// use std::sync::Arc;
///
/// let handler = FnSessionExpiryHandler::new(|event| {
///     Box::pin(async move {
///         eprintln!("Session ended: {}", event.reason);
///     })
/// });
///
/// let shared: SharedSessionExpiryHandler = Arc::new(handler);
/// ```
pub struct FnSessionExpiryHandler<F>
where
    F: Fn(SessionEnded) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
        + Send
        + Sync,
{
    func: F,
}

impl<F> FnSessionExpiryHandler<F>
where
    F: Fn(SessionEnded) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
        + Send
        + Sync,
{
    /// Create a new function-based handler.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> SessionExpiryHandler for FnSessionExpiryHandler<F>
where
    F: Fn(SessionEnded) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
        + Send
        + Sync,
{
    async fn on_session_expired(&self, event: SessionEnded) {
        (self.func)(event).await;
    }
}

// ============================================================================
// Channel forwarding
// ============================================================================

/// Forwards every event into an unbounded tokio channel.
///
/// Useful when the reaction lives in an event loop elsewhere, such as a
/// CLI main loop or a UI task.
#[derive(Debug, Clone)]
pub struct ChannelSessionExpiryHandler {
    tx: mpsc::UnboundedSender<SessionEnded>,
}

impl ChannelSessionExpiryHandler {
    /// Create a handler and the receiving end of its channel
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEnded>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl SessionExpiryHandler for ChannelSessionExpiryHandler {
    async fn on_session_expired(&self, event: SessionEnded) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Session expiry receiver dropped; event discarded");
        }
    }
}
