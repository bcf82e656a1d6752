//! Typed wrappers over the remote resources
//!
//! Each service borrows an [`AuthenticatedChannel`], so every call gets the
//! credential handling for free. Obtain them from
//! [`ExpenseClient`](crate::ExpenseClient):
//!
//! ```no_run
//! # use expensevista_client::{ExpenseClient, ClientConfig};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ExpenseClient::new(ClientConfig::from_env()?)?;
//! let categories = client.categories().list().await?;
//! println!("{} categories", categories.len());
//! # Ok(())
//! # }
//! ```

mod analytics;
mod budgets;
mod categories;
mod dashboard;
mod transactions;
mod wallet;

pub use analytics::AnalyticsService;
pub use budgets::BudgetService;
pub use categories::CategoryService;
pub use dashboard::DashboardService;
pub use transactions::TransactionService;
pub use wallet::{TopUpService, WalletService};
