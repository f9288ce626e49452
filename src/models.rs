//! Wire types returned by the AQI backend.
//!
//! Numeric fields are `Option<f64>` throughout: the backend emits `null` for
//! readings and metrics it does not have, and those gaps are carried forward
//! rather than dropped or zeroed.

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

/// One observed reading from `/aqi/history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHistoryPoint {
    /// ISO-8601 timestamp. Daily-averaged backends send `date` instead.
    #[serde(alias = "date")]
    pub timestamp: String,
    pub real_aqi: Option<f64>,
}

/// One predicted daily average from `/aqi/forecast`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecastPoint {
    /// ISO-8601 date (a full timestamp is tolerated).
    pub date: String,
    pub avg_aqi: Option<f64>,
}

/// Evaluation metrics of one registered model version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default, deserialize_with = "string_or_number")]
    pub version: String,
    pub run_name: Option<String>,
    pub mae_24h: Option<f64>,
    pub mae_48h: Option<f64>,
    pub mae_72h: Option<f64>,
    pub rmse_24h: Option<f64>,
    pub rmse_48h: Option<f64>,
    pub rmse_72h: Option<f64>,
    pub rmse_avg: Option<f64>,
    pub stage: Option<String>,
}

/// Body of `/models/metrics/latest`.
///
/// `other_models` keeps the backend's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub production_model: Option<ModelMetrics>,
    #[serde(default)]
    pub other_models: Vec<ModelMetrics>,
}

/// Body of `/aqi/forecast`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub city: Option<String>,
    pub forecasts: Vec<RawForecastPoint>,
}

/// Body of `/aqi/history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<RawHistoryPoint>,
}

// Model registries report versions as integers; accept either form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected string or number for version, found {other}"
        ))),
    }
}
