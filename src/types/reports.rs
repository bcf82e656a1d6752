//! Dashboard and analytics payloads

use serde::{Deserialize, Serialize};

use super::budgets::Budget;

/// Dashboard landing data
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Period totals, passed through unchanged
    pub summary: serde_json::Value,
    /// Current monthly budget
    pub budget: Budget,
}

/// Reporting window accepted by the analytics endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportPeriod {
    /// Current calendar month
    #[serde(rename = "This Month")]
    ThisMonth,
    /// Trailing three months
    #[serde(rename = "Last 3 Months")]
    LastThreeMonths,
    /// Trailing six months
    #[serde(rename = "Last 6 Months")]
    LastSixMonths,
    /// Current calendar year
    #[serde(rename = "This Year")]
    ThisYear,
}

impl ReportPeriod {
    /// Wire value of the period
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThisMonth => "This Month",
            Self::LastThreeMonths => "Last 3 Months",
            Self::LastSixMonths => "Last 6 Months",
            Self::ThisYear => "This Year",
        }
    }
}

/// Budget progress in an analytics report
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BudgetProgress {
    /// Amount spent
    pub spent: f64,
    /// Budget total
    pub total: f64,
    /// Spent as a percentage of total
    pub percentage: f64,
}

/// Spending share of one category
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpendingCategory {
    /// Category name
    pub name: String,
    /// Amount spent
    pub value: f64,
    /// Share of total spending
    pub percentage: f64,
}

/// Income and expenses for one month
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyFlow {
    /// Month label
    pub month: String,
    /// Income total
    pub income: f64,
    /// Expense total
    pub expenses: f64,
}

/// Headline figures for a report
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInsights {
    /// Category with the highest spending
    pub top_spending_category: String,
    /// Spending in that category
    pub top_spending_amount: f64,
    /// Number of transactions in the period
    pub total_transactions: u64,
    /// Number of income transactions
    pub total_income_transactions: u64,
    /// Number of expense transactions
    pub total_expense_transactions: u64,
}

/// Analytics report for one period
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    /// Period covered
    pub time_period: ReportPeriod,
    /// Budget progress
    pub budget_progress: BudgetProgress,
    /// Spending split by category
    pub spending_by_category: Vec<SpendingCategory>,
    /// Income against expenses per month
    pub income_vs_expenses: Vec<MonthlyFlow>,
    /// Trend series
    pub financial_trend: Vec<MonthlyFlow>,
    /// Headline figures
    pub key_insights: KeyInsights,
}
