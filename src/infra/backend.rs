use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::error::FetchError;
use crate::fetch::{BasicClient, HttpClient, fetch_json};
use crate::models::{
    ForecastResponse, HistoryResponse, MetricsSnapshot, RawForecastPoint, RawHistoryPoint,
};
use crate::services::dashboard_api::DashboardApi;

pub const METRICS_PATH: &str = "/models/metrics/latest";
pub const FORECAST_PATH: &str = "/aqi/forecast";
pub const HISTORY_PATH: &str = "/aqi/history";

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`DashboardApi`] over HTTP against the configured base URL.
pub struct BackendClient<C = BasicClient> {
    http: C,
    config: DashboardConfig,
}

impl BackendClient<BasicClient> {
    /// A client over `reqwest` with [`CONNECT_TIMEOUT`] and [`REQUEST_TIMEOUT`].
    pub fn new(config: DashboardConfig) -> reqwest::Result<Self> {
        let http = BasicClient::with_timeouts(CONNECT_TIMEOUT, REQUEST_TIMEOUT)?;
        Ok(Self::with_client(http, config))
    }
}

impl<C: HttpClient> BackendClient<C> {
    pub fn with_client(http: C, config: DashboardConfig) -> Self {
        Self { http, config }
    }

    pub fn metrics_url(&self) -> String {
        self.config.endpoint(METRICS_PATH)
    }

    pub fn forecast_url(&self) -> String {
        self.config.endpoint(FORECAST_PATH)
    }

    pub fn history_url(&self, days: u32) -> String {
        format!("{}?days={}", self.config.endpoint(HISTORY_PATH), days)
    }
}

#[async_trait]
impl<C: HttpClient> DashboardApi for BackendClient<C> {
    async fn latest_metrics(&self) -> Result<MetricsSnapshot, FetchError> {
        let snapshot: MetricsSnapshot = fetch_json(&self.http, &self.metrics_url()).await?;
        info!(
            has_production = snapshot.production_model.is_some(),
            other_models = snapshot.other_models.len(),
            "Model metrics fetched"
        );
        Ok(snapshot)
    }

    async fn forecast(&self) -> Result<Vec<RawForecastPoint>, FetchError> {
        let response: ForecastResponse = fetch_json(&self.http, &self.forecast_url()).await?;
        debug!(city = ?response.city, "Forecast response decoded");
        info!(points = response.forecasts.len(), "Forecast fetched");
        Ok(response.forecasts)
    }

    async fn history(&self, days: u32) -> Result<Vec<RawHistoryPoint>, FetchError> {
        let response: HistoryResponse = fetch_json(&self.http, &self.history_url(days)).await?;
        info!(days, points = response.history.len(), "History fetched");
        Ok(response.history)
    }
}
