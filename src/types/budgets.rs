//! Monthly budget payloads

use serde::{Deserialize, Serialize};

use super::identifiers::BudgetId;

/// Monthly budget with usage figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Identifier
    pub id: BudgetId,
    /// Spending limit for the month
    pub monthly_limit: f64,
    /// Month the budget applies to, as sent by the API
    pub budget_month: String,
    /// Amount spent so far
    pub current_usage: f64,
    /// Limit minus usage
    pub remaining_amount: f64,
    /// Usage as a percentage of the limit
    pub percentage_used: f64,
    /// Income recorded in the month
    #[serde(default)]
    pub total_income: Option<f64>,
}

/// New or updated monthly limit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLimit {
    /// Spending limit for the month
    pub monthly_limit: f64,
}
