//! Type definitions for the ExpenseVista API
//!
//! Identifier newtypes plus the request and response payloads of each
//! remote resource. Field names follow the API's camelCase wire format.

pub mod auth;
pub mod budgets;
pub mod categories;
pub mod identifiers;
pub mod reports;
pub mod transactions;
pub mod wallet;

pub use auth::{
    ApiMessage, LoginRequest, LoginResponse, RegisterRequest, RenewalResponse,
    ResetPasswordRequest, Session, TokenEnvelope, UserProfile,
};
pub use budgets::{Budget, BudgetLimit};
pub use categories::{Category, CreateCategory};
pub use identifiers::{AccessToken, BudgetId, CategoryId, TransactionId};
pub use reports::{
    BudgetProgress, Dashboard, FinancialReport, KeyInsights, MonthlyFlow, ReportPeriod,
    SpendingCategory,
};
pub use transactions::{
    CreateTransaction, EditTransaction, Page, PageRequest, Transaction, TransactionFilter,
    TransactionType,
};
pub use wallet::{RecipientRequest, TopUpRequest, TopUpSession, TransferRequest, WalletBalance};
