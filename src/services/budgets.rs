//! Monthly budgets

use crate::channel::AuthenticatedChannel;
use crate::error::Result;
use crate::types::{Budget, BudgetId, BudgetLimit};

/// Budget endpoints
#[derive(Debug, Clone, Copy)]
pub struct BudgetService<'a> {
    channel: &'a AuthenticatedChannel,
}

impl<'a> BudgetService<'a> {
    pub(crate) fn new(channel: &'a AuthenticatedChannel) -> Self {
        Self { channel }
    }

    /// Set the limit for the current month
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn create_monthly(&self, monthly_limit: f64) -> Result<Budget> {
        self.channel
            .post_json("/budgets", &BudgetLimit { monthly_limit })
            .await
    }

    /// Change an existing monthly limit
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn update_monthly(&self, id: BudgetId, monthly_limit: f64) -> Result<Budget> {
        self.channel
            .put_json(&format!("/budgets/{id}"), &BudgetLimit { monthly_limit })
            .await
    }
}
