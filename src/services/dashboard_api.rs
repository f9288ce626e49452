//! Trait for reading the dashboard's three data sources.

use crate::error::FetchError;
use crate::models::{MetricsSnapshot, RawForecastPoint, RawHistoryPoint};

/// Read-only access to the AQI backend, one method per endpoint.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /models/metrics/latest`
    async fn latest_metrics(&self) -> Result<MetricsSnapshot, FetchError>;

    /// `GET /aqi/forecast`
    async fn forecast(&self) -> Result<Vec<RawForecastPoint>, FetchError>;

    /// `GET /aqi/history?days={days}`
    async fn history(&self, days: u32) -> Result<Vec<RawHistoryPoint>, FetchError>;
}
