//! Wallet, transfers and card top-up

use crate::channel::AuthenticatedChannel;
use crate::error::Result;
use crate::transport::ApiRequest;
use crate::types::{RecipientRequest, TopUpRequest, TopUpSession, TransferRequest, WalletBalance};

/// Wallet and transfer endpoints
#[derive(Debug, Clone, Copy)]
pub struct WalletService<'a> {
    channel: &'a AuthenticatedChannel,
}

impl<'a> WalletService<'a> {
    pub(crate) fn new(channel: &'a AuthenticatedChannel) -> Self {
        Self { channel }
    }

    /// Current balance
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn balance(&self) -> Result<f64> {
        let balance: WalletBalance = self.channel.get_json("/wallet/balance").await?;
        Ok(balance.balance)
    }

    /// Wallet movements, shape defined by the payment provider
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn transactions(&self) -> Result<Vec<serde_json::Value>> {
        self.channel.get_json("/wallet/transactions").await
    }

    /// Start a transfer to a resolved recipient
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<serde_json::Value> {
        self.channel.post_json("/transfer/initiate", request).await
    }

    /// Resolve bank details into a transfer recipient
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn resolve_recipient(&self, request: &RecipientRequest) -> Result<serde_json::Value> {
        self.channel.post_json("/transfer/resolve", request).await
    }
}

/// Card top-up endpoints
#[derive(Debug, Clone, Copy)]
pub struct TopUpService<'a> {
    channel: &'a AuthenticatedChannel,
}

impl<'a> TopUpService<'a> {
    pub(crate) fn new(channel: &'a AuthenticatedChannel) -> Self {
        Self { channel }
    }

    /// Start a top-up; returns the URL the user must visit to pay
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn initialize(&self, email: impl Into<String>, amount: f64) -> Result<String> {
        let body = TopUpRequest {
            email: email.into(),
            amount,
        };
        let session: TopUpSession = self.channel.post_json("/paystack/initialize", &body).await?;
        Ok(session.authorization_url)
    }

    /// Check the outcome of a payment by its reference
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn verify(&self, reference: &str) -> Result<serde_json::Value> {
        self.channel
            .fetch(ApiRequest::get(format!("/paystack/verify/{reference}")))
            .await
    }
}
