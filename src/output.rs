//! Text, JSON and CSV rendering of dashboard data.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use crate::cards::AqiCard;
use crate::metrics_table::{HEADERS, MetricsRow, UNAVAILABLE, format_metric};
use crate::normalize::{ChartPoint, SeriesKind};
use crate::severity::{SeverityLevel, label_for};

/// Renders the model table with aligned columns. The production row is
/// prefixed with `*`.
pub fn render_metrics_table(rows: &[MetricsRow]) -> String {
    let body: Vec<Vec<String>> = rows.iter().map(MetricsRow::cells).collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for cells in &body {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&table_line("  ", HEADERS.iter().copied(), &widths));
    for (row, cells) in rows.iter().zip(&body) {
        let marker = if row.is_production { "* " } else { "  " };
        out.push_str(&table_line(marker, cells.iter().map(String::as_str), &widths));
    }
    out
}

fn table_line<'a>(marker: &str, cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    format!("{marker}{}\n", padded.join("  ").trim_end())
}

/// One line per point: label, value, series and severity.
pub fn render_chart(points: &[ChartPoint]) -> String {
    points
        .iter()
        .map(|p| {
            let kind = match p.kind {
                SeriesKind::Observed => "observed",
                SeriesKind::Forecast => "forecast",
            };
            format!(
                "{:<18} {:>8}  {:<8}  {}\n",
                p.label,
                format_metric(p.value),
                kind,
                label_for(p.value)
            )
        })
        .collect()
}

/// One line per card.
pub fn render_cards(cards: &[AqiCard]) -> String {
    cards
        .iter()
        .map(|c| {
            let value = c
                .value
                .map_or_else(|| UNAVAILABLE.to_string(), |v| format!("{}", v.round() as i64));
            format!(
                "{:<10} {:<18} {:>5}  {}\n",
                c.weekday,
                c.date,
                value,
                label_for(c.value)
            )
        })
        .collect()
}

/// The EPA guide: range, label, color and description of every level.
pub fn render_levels() -> String {
    SeverityLevel::ALL
        .iter()
        .map(|l| {
            format!(
                "{:<8} {:<31} {}  {}\n",
                l.range_label(),
                l.label(),
                l.color(),
                l.description()
            )
        })
        .collect()
}

/// Section-title suffix saying when a source was last loaded.
pub fn loaded_note(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => format!(" (loaded {} UTC)", at.format("%H:%M:%S")),
        None => " (not loaded)".to_string(),
    }
}

/// Pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Appends chart points as CSV rows.
///
/// Creates the file with headers if it does not already exist.
pub fn append_chart_points(path: &str, points: &[ChartPoint]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = points.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelMetrics;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn point(label: &str, value: Option<f64>, kind: SeriesKind) -> ChartPoint {
        ChartPoint {
            label: label.to_string(),
            value,
            kind,
        }
    }

    #[test]
    fn test_metrics_table_marks_production() {
        let rows = vec![
            MetricsRow {
                model: ModelMetrics {
                    version: "2".to_string(),
                    run_name: Some("xgboost".to_string()),
                    rmse_24h: Some(10.0),
                    ..Default::default()
                },
                is_production: true,
            },
            MetricsRow {
                model: ModelMetrics {
                    version: "1".to_string(),
                    ..Default::default()
                },
                is_production: false,
            },
        ];
        let table = render_metrics_table(&rows);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  Version"));
        assert!(lines[1].starts_with("* 2"));
        assert!(lines[1].contains("10.00"));
        assert!(lines[2].starts_with("  1"));
        assert!(lines[2].contains(UNAVAILABLE));
    }

    #[test]
    fn test_empty_table_has_header_only() {
        assert_eq!(render_metrics_table(&[]).lines().count(), 1);
    }

    #[test]
    fn test_render_chart_shows_gaps() {
        let text = render_chart(&[
            point("Mon, Jan 01 00:00", Some(55.0), SeriesKind::Observed),
            point("Tue, Jan 02", None, SeriesKind::Forecast),
        ]);
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].contains("55.00"));
        assert!(lines[0].contains("Moderate"));
        assert!(lines[1].contains(UNAVAILABLE));
        assert!(lines[1].contains("No Data"));
    }

    #[test]
    fn test_render_levels_lists_all() {
        let text = render_levels();
        assert_eq!(text.lines().count(), 6);
        assert!(text.lines().last().unwrap().starts_with("301+"));
    }

    #[test]
    fn test_loaded_note() {
        let at = DateTime::parse_from_rfc3339("2024-01-01T08:05:09Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(loaded_note(Some(at)), " (loaded 08:05:09 UTC)");
        assert_eq!(loaded_note(None), " (not loaded)");
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&[point("a", None, SeriesKind::Forecast)]).unwrap();
        assert!(json.contains("\"kind\": \"forecast\""));
        assert!(json.contains("\"value\": null"));
    }

    #[test]
    fn test_append_chart_points_writes_header_once() {
        let path = temp_path("aqi_dashboard_test_header.csv");
        let _ = fs::remove_file(&path);

        let points = vec![
            point("Mon, Jan 01 00:00", Some(55.0), SeriesKind::Observed),
            point("Tue, Jan 02", None, SeriesKind::Forecast),
        ];
        append_chart_points(&path, &points).unwrap();
        append_chart_points(&path, &points).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "label,value,kind");
        assert_eq!(lines[1], "\"Mon, Jan 01 00:00\",55.0,observed");
        assert_eq!(lines[2], "\"Tue, Jan 02\",,forecast");

        fs::remove_file(&path).unwrap();
    }
}
