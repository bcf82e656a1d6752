//! Analytics report and export

use bytes::Bytes;

use crate::channel::AuthenticatedChannel;
use crate::error::Result;
use crate::transport::ApiRequest;
use crate::types::{FinancialReport, ReportPeriod};

/// Analytics endpoints
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsService<'a> {
    channel: &'a AuthenticatedChannel,
}

impl<'a> AnalyticsService<'a> {
    pub(crate) fn new(channel: &'a AuthenticatedChannel) -> Self {
        Self { channel }
    }

    /// Aggregated report for a period
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn report(&self, period: ReportPeriod) -> Result<FinancialReport> {
        let request = ApiRequest::get("/analytics").query("period", period.as_str());
        self.channel.fetch(request).await
    }

    /// Exported report document as raw bytes
    ///
    /// # Errors
    ///
    /// Returns the channel's errors.
    pub async fn export(&self, period: ReportPeriod) -> Result<Bytes> {
        let body = serde_json::json!({ "period": period.as_str() });
        let request = ApiRequest::post("/report-export/export").json(&body)?;
        self.channel.fetch_bytes(request).await
    }
}
