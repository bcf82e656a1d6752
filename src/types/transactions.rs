//! Transaction payloads and paging

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::categories::Category;
use super::identifiers::{CategoryId, TransactionId};

/// Direction of a transaction, encoded as the backend's integer enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TransactionType {
    /// Money out
    Expense,
    /// Money in
    Income,
}

impl From<TransactionType> for u8 {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Expense => 0,
            TransactionType::Income => 1,
        }
    }
}

impl TryFrom<u8> for TransactionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Expense),
            1 => Ok(Self::Income),
            other => Err(format!("unknown transaction type {other}")),
        }
    }
}

/// A recorded transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Identifier
    pub id: TransactionId,
    /// Amount in the transaction currency, as sent by the API
    pub amount: String,
    /// Free-form note
    #[serde(default)]
    pub description: Option<String>,
    /// Expense or income
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// ISO-8601 timestamp
    pub transaction_date: String,
    /// Assigned category
    pub category: Category,
    /// Currency code
    pub currency: String,
    /// Amount converted to the account currency
    pub converted_amount: String,
}

/// New transaction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    /// Amount as entered
    pub amount: String,
    /// Expense or income
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// ISO-8601 timestamp
    pub transaction_date: String,
    /// Category to file under
    pub category_id: CategoryId,
    /// Free-form note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Full replacement of an existing transaction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTransaction {
    /// Identifier, repeated in the body
    pub id: TransactionId,
    /// Amount
    pub amount: f64,
    /// Expense or income
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// ISO-8601 timestamp
    pub transaction_date: String,
    /// Category to file under
    pub category_id: CategoryId,
    /// Free-form note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Optional filters for paged transaction queries
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    /// Substring match on the description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Restrict to one category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Restrict to expenses or income
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    /// Inclusive lower date bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper date bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Page request for transaction queries
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// One-based page number
    pub page: u32,
    /// Page size
    pub records_per_page: u32,
    /// Optional filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<TransactionFilter>,
}

impl PageRequest {
    /// First page with the given size
    #[must_use]
    pub fn first(records_per_page: u32) -> Self {
        Self {
            page: 1,
            records_per_page,
            filters: None,
        }
    }

    /// Same request for the following page
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }
}

/// One page of results
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// One-based page number
    pub page: u32,
    /// Page size
    pub records_per_page: u32,
    /// Total matching records
    pub total_records: u64,
    /// Total number of pages
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Whether another page follows this one
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
