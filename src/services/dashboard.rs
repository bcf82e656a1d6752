//! Dashboard summary

use crate::channel::AuthenticatedChannel;
use crate::error::Result;
use crate::types::Dashboard;

/// Dashboard endpoint
#[derive(Debug, Clone, Copy)]
pub struct DashboardService<'a> {
    channel: &'a AuthenticatedChannel,
}

impl<'a> DashboardService<'a> {
    pub(crate) fn new(channel: &'a AuthenticatedChannel) -> Self {
        Self { channel }
    }

    /// Current month summary and budget
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn get(&self) -> Result<Dashboard> {
        self.channel.get_json("/dashboard").await
    }
}
