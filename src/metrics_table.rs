//! Rows of the model-performance table.

use serde::Serialize;

use crate::models::{MetricsSnapshot, ModelMetrics};

/// Cell text for a metric the backend did not report.
pub const UNAVAILABLE: &str = "N/A";

/// Column headers, in the order produced by [`MetricsRow::cells`].
pub const HEADERS: [&str; 10] = [
    "Version",
    "Model Name",
    "Stage",
    "MAE 24h",
    "MAE 48h",
    "MAE 72h",
    "RMSE 24h",
    "RMSE 48h",
    "RMSE 72h",
    "Avg RMSE",
];

/// One table row, tagged for production highlighting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    #[serde(flatten)]
    pub model: ModelMetrics,
    pub is_production: bool,
}

impl MetricsRow {
    /// Display text for every column; missing values become [`UNAVAILABLE`].
    pub fn cells(&self) -> Vec<String> {
        let m = &self.model;
        let mut cells = vec![
            m.version.clone(),
            text_cell(m.run_name.as_deref()),
            text_cell(m.stage.as_deref()),
        ];
        cells.extend(
            [
                m.mae_24h, m.mae_48h, m.mae_72h, m.rmse_24h, m.rmse_48h, m.rmse_72h, m.rmse_avg,
            ]
            .into_iter()
            .map(format_metric),
        );
        cells
    }
}

/// Builds table rows: the production model first (if any), then the other
/// models in backend order.
pub fn build_metrics_rows(snapshot: &MetricsSnapshot) -> Vec<MetricsRow> {
    snapshot
        .production_model
        .iter()
        .map(|m| MetricsRow {
            model: m.clone(),
            is_production: true,
        })
        .chain(snapshot.other_models.iter().map(|m| MetricsRow {
            model: m.clone(),
            is_production: false,
        }))
        .collect()
}

/// Formats a metric to two decimals, or [`UNAVAILABLE`] when it is missing or
/// not a finite number.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => UNAVAILABLE.to_string(),
    }
}

fn text_cell(value: Option<&str>) -> String {
    match value {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => UNAVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(version: &str) -> ModelMetrics {
        ModelMetrics {
            version: version.to_string(),
            run_name: Some(format!("run-{version}")),
            stage: Some("None".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_production_model() {
        let snapshot = MetricsSnapshot {
            production_model: None,
            other_models: vec![model("1"), model("2")],
        };
        let rows = build_metrics_rows(&snapshot);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.is_production));
        assert_eq!(rows[0].model.version, "1");
        assert_eq!(rows[1].model.version, "2");
    }

    #[test]
    fn test_production_model_comes_first() {
        let snapshot = MetricsSnapshot {
            production_model: Some(model("9")),
            other_models: vec![model("1")],
        };
        let rows = build_metrics_rows(&snapshot);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].model.version, "9");
        assert!(rows[0].is_production);
        assert_eq!(rows[1].model.version, "1");
        assert!(!rows[1].is_production);
    }

    #[test]
    fn test_other_models_are_not_resorted() {
        let snapshot = MetricsSnapshot {
            production_model: None,
            other_models: vec![model("3"), model("1"), model("2")],
        };
        let versions: Vec<_> = build_metrics_rows(&snapshot)
            .into_iter()
            .map(|r| r.model.version)
            .collect();
        assert_eq!(versions, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(build_metrics_rows(&MetricsSnapshot::default()).is_empty());
    }

    #[test]
    fn test_missing_metric_renders_unavailable() {
        let mut m = model("4");
        m.rmse_24h = None;
        m.rmse_48h = Some(12.345);
        let row = MetricsRow {
            model: m,
            is_production: false,
        };
        let cells = row.cells();

        assert_eq!(cells.len(), HEADERS.len());
        assert_eq!(cells[6], UNAVAILABLE);
        assert_eq!(cells[7], "12.35");
        assert!(!cells.iter().any(|c| c.contains("NaN")));
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(Some(3.14159)), "3.14");
        assert_eq!(format_metric(Some(0.0)), "0.00");
        assert_eq!(format_metric(None), UNAVAILABLE);
        assert_eq!(format_metric(Some(f64::NAN)), UNAVAILABLE);
    }

    #[test]
    fn test_missing_run_name_renders_unavailable() {
        let row = MetricsRow {
            model: ModelMetrics {
                version: "5".to_string(),
                ..Default::default()
            },
            is_production: true,
        };
        let cells = row.cells();
        assert_eq!(cells[1], UNAVAILABLE);
        assert_eq!(cells[2], UNAVAILABLE);
    }
}
