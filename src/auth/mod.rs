//! Credential handling for the authenticated request layer
//!
//! # Overview
//!
//! - [`CredentialStore`] holds the short-lived access credential in memory.
//! - [`UnauthenticatedChannel`] talks to the login, renewal and logout
//!   endpoints without a bearer credential.
//! - [`SessionExpiryBus`] carries "session ended" to the application without
//!   the transport layer depending on it.
//! - [`RenewalCoordinator`] runs at most one renewal at a time and replays
//!   every call that stalled on it.
//! - [`ProfileStorage`] remembers the signed-in user profile across restarts.
//!
//! # Security
//!
//! - The access credential is never written to disk or logged
//! - The long-lived session credential is an HTTP cookie held by the
//!   transport and is never visible to application code
//! - Profile files are stored with user-only permissions (600)

mod credential;
mod expiry;
mod profile;
mod renewal;
mod unauthenticated;

pub use crate::types::AccessToken;
pub use credential::CredentialStore;
pub use expiry::SessionExpiryBus;
pub use profile::ProfileStorage;
pub use renewal::{PendingReplay, RenewalCoordinator, RenewalState};
pub use unauthenticated::UnauthenticatedChannel;
