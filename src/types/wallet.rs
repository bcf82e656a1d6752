//! Wallet and top-up payloads

use serde::{Deserialize, Serialize};

/// Wallet balance response
#[derive(Debug, Clone, Deserialize)]
pub struct WalletBalance {
    /// Current balance
    pub balance: f64,
}

/// Outgoing transfer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Resolved recipient code
    pub recipient_code: String,
    /// Amount to send
    pub amount: f64,
    /// Optional narration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Recipient account to resolve before a transfer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientRequest {
    /// Account holder name
    pub name: String,
    /// Bank account number
    pub account_number: String,
    /// Bank code
    pub bank_code: String,
}

/// Top-up initialization
#[derive(Debug, Clone, Serialize)]
pub struct TopUpRequest {
    /// Payer email
    pub email: String,
    /// Amount to add
    pub amount: f64,
}

/// Top-up initialization response.
///
/// The API spells the field `authoriazationUrl`; both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct TopUpSession {
    /// Hosted payment page
    #[serde(rename = "authoriazationUrl", alias = "authorizationUrl")]
    pub authorization_url: String,
}
