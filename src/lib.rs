//! # ExpenseVista client for Rust
//!
//! Async client for the ExpenseVista personal-finance API.
//! Tokio-based, strongly typed, with transparent access-credential renewal.
//!
//! ## Quick Start
//!
//! ```no_run
//! use expensevista_client::{ClientConfig, ExpenseClient, LoginRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ExpenseClient::new(ClientConfig::from_env()?)?;
//!     client.login(&LoginRequest::new("ada@example.com", "secret")).await?;
//!
//!     for transaction in client.transactions().list().await? {
//!         println!("{} {}", transaction.transaction_date, transaction.amount);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Features
//!
//! ### 1. Transparent credential renewal
//!
//! Every call made through [`AuthenticatedChannel`] carries the current
//! short-lived access credential. When the server answers with an
//! authorization failure, the [`RenewalCoordinator`] renews the credential
//! once, no matter how many calls failed at the same time, and replays each
//! of them with the new credential. Callers only see the replayed outcome.
//!
//! A call is replayed at most once. Failures on the renewal and logout
//! endpoints themselves are never recovered.
//!
//! ### 2. Session expiry notification
//!
//! When renewal fails, every waiting call is rejected with
//! [`ClientError::SessionExpired`] and the application's handler is invoked
//! exactly once:
//!
//! ```no_run
//! # use expensevista_client::{ClientConfig, ExpenseClient};
//! # use expensevista_client::callbacks::ChannelSessionExpiryHandler;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ExpenseClient::new(ClientConfig::default())?;
//! let (handler, mut expired) = ChannelSessionExpiryHandler::new();
//! client.on_session_expired(handler);
//!
//! tokio::spawn(async move {
//!     while let Some(event) = expired.recv().await {
//!         eprintln!("Signed out: {}", event.reason);
//!     }
//! });
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. Typed resources
//!
//! See the [`services`] module.
//!
//! ## Architecture
//!
//! - [`config`]: Base URL, endpoint paths, timeouts
//! - [`transport`]: The HTTP seam and its `reqwest` implementation
//! - [`auth`]: Credential store, renewal coordinator, expiry bus, profile storage
//! - [`channel`]: The credential-bearing request pipeline
//! - [`callbacks`]: Session-expiry handler traits
//! - [`client`]: The [`ExpenseClient`] facade
//! - [`services`]: Typed resource endpoints
//! - [`types`]: API payloads and identifiers
//! - [`error`]: Error types and backend message extraction
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! Tracing events are always emitted but are zero-cost when no subscriber is attached.
//! Access credentials never appear in log output.
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, ClientError>`](Result).
//! [`ClientError::class`] tells a lost session apart from an ordinary failure:
//!
//! ```no_run
//! # use expensevista_client::{ClientConfig, ExpenseClient, ErrorClass};
//! # async fn example(client: ExpenseClient) {
//! match client.dashboard().get().await {
//!     Ok(dashboard) => println!("{:?}", dashboard.budget),
//!     Err(e) if e.class() == ErrorClass::SessionExpired => {
//!         eprintln!("Please sign in again");
//!     }
//!     Err(e) => eprintln!("{}", e.user_messages().join("\n")),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod callbacks;
pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod services;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use auth::{
    AccessToken, CredentialStore, ProfileStorage, RenewalCoordinator, RenewalState,
    SessionExpiryBus, UnauthenticatedChannel,
};
pub use callbacks::{
    ChannelSessionExpiryHandler, FnSessionExpiryHandler, SessionEnded, SessionExpiryHandler,
    SharedSessionExpiryHandler,
};
pub use channel::AuthenticatedChannel;
pub use client::ExpenseClient;
pub use config::ClientConfig;
pub use error::{ClientError, ErrorClass, Result};
pub use futures::StreamExt;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
pub use types::{
    Budget, Category, CategoryId, CreateTransaction, Dashboard, EditTransaction, FinancialReport,
    LoginRequest, Page, PageRequest, RegisterRequest, ReportPeriod, ResetPasswordRequest,
    Transaction, TransactionFilter, TransactionId, TransactionType, UserProfile,
};

/// Version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
