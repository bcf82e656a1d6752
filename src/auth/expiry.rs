//! Single-subscriber "session ended" channel

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::callbacks::{SessionEnded, SessionExpiryHandler, SharedSessionExpiryHandler};

/// Decouples the renewal machinery from whatever reacts to a lost session.
///
/// Exactly one handler is installed at a time; the last [`subscribe`] wins.
/// Publishing with no handler installed is a no-op, so the transport side can
/// be constructed before the application registers interest.
///
/// [`subscribe`]: SessionExpiryBus::subscribe
#[derive(Clone, Default)]
pub struct SessionExpiryBus {
    handler: Arc<Mutex<Option<SharedSessionExpiryHandler>>>,
    on_login_surface: Arc<AtomicBool>,
}

impl std::fmt::Debug for SessionExpiryBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionExpiryBus")
            .field("subscribed", &self.is_subscribed())
            .field("on_login_surface", &self.is_on_login_surface())
            .finish()
    }
}

impl SessionExpiryBus {
    /// Create a bus with no subscriber
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the handler, replacing any previous one
    pub fn subscribe(&self, handler: impl SessionExpiryHandler + 'static) {
        self.subscribe_shared(Arc::new(handler));
    }

    /// Install an already shared handler, replacing any previous one
    pub fn subscribe_shared(&self, handler: SharedSessionExpiryHandler) {
        if let Ok(mut slot) = self.handler.lock() {
            *slot = Some(handler);
        }
    }

    /// Remove the current handler
    pub fn unsubscribe(&self) {
        if let Ok(mut slot) = self.handler.lock() {
            *slot = None;
        }
    }

    /// Whether a handler is installed
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.handler.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Invoke the current handler, if any.
    ///
    /// Returns `true` if a handler received the event.
    pub async fn publish(&self, event: SessionEnded) -> bool {
        let handler = self.handler.lock().ok().and_then(|slot| slot.clone());
        match handler {
            Some(handler) => {
                tracing::info!(reason = %event.reason, "Publishing session expiry");
                handler.on_session_expired(event).await;
                true
            }
            None => {
                tracing::debug!("Session expired with no subscriber installed");
                false
            }
        }
    }

    /// Record whether the application is already showing its login surface
    pub fn set_on_login_surface(&self, on_login: bool) {
        self.on_login_surface.store(on_login, Ordering::SeqCst);
    }

    /// Whether the application is already showing its login surface
    #[must_use]
    pub fn is_on_login_surface(&self) -> bool {
        self.on_login_surface.load(Ordering::SeqCst)
    }
}
