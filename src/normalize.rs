//! Turns backend series into uniform, chart-ready points.
//!
//! History and forecast share one label formatter so that both series read
//! consistently when concatenated on a single axis. Input order is kept as is;
//! only the explicit daily-grouping helpers reorder by date.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{RawForecastPoint, RawHistoryPoint};

const DATE_LABEL: &str = "%a, %b %d";
const DATE_TIME_LABEL: &str = "%a, %b %d %H:%M";

/// Which series a chart point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Observed,
    Forecast,
}

/// A single point on the AQI chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    /// `None` where the backend had no value; rendered as a gap.
    pub value: Option<f64>,
    pub kind: SeriesKind,
}

/// Parses the timestamp and date shapes the backend emits.
///
/// Accepts RFC 3339 (converted to UTC), naive `T`- or space-separated
/// date-times with optional fractional seconds, and bare `YYYY-MM-DD` dates
/// (read as midnight).
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Formats a raw timestamp as a human label: weekday and date, plus the time
/// of day when `with_time` is set.
///
/// Unparseable input is returned verbatim.
pub fn format_label(raw: &str, with_time: bool) -> String {
    match parse_instant(raw) {
        Some(at) => {
            let fmt = if with_time { DATE_TIME_LABEL } else { DATE_LABEL };
            at.format(fmt).to_string()
        }
        None => {
            debug!(raw, "Unparseable timestamp kept as label");
            raw.to_string()
        }
    }
}

pub fn normalize_history(points: &[RawHistoryPoint]) -> Vec<ChartPoint> {
    points
        .iter()
        .map(|p| ChartPoint {
            label: format_label(&p.timestamp, true),
            value: p.real_aqi,
            kind: SeriesKind::Observed,
        })
        .collect()
}

pub fn normalize_forecast(points: &[RawForecastPoint]) -> Vec<ChartPoint> {
    points
        .iter()
        .map(|p| ChartPoint {
            label: format_label(&p.date, false),
            value: p.avg_aqi,
            kind: SeriesKind::Forecast,
        })
        .collect()
}

/// Observed history followed by the forecast, as drawn on the trend chart.
pub fn trend(history: &[RawHistoryPoint], forecast: &[RawForecastPoint]) -> Vec<ChartPoint> {
    let mut points = normalize_history(history);
    points.extend(normalize_forecast(forecast));
    points
}

/// Collapses hourly readings into one averaged reading per calendar day.
///
/// Days come out in ascending order with a `YYYY-MM-DD` timestamp. A day whose
/// readings are all missing keeps a missing value. Readings with unparseable
/// timestamps are appended unchanged after the dated days.
pub fn daily_history(points: &[RawHistoryPoint]) -> Vec<RawHistoryPoint> {
    let (days, undated) = average_by_date(points.iter().map(|p| (p.timestamp.as_str(), p.real_aqi)));

    days.into_iter()
        .map(|(date, real_aqi)| RawHistoryPoint {
            timestamp: date.format("%Y-%m-%d").to_string(),
            real_aqi,
        })
        .chain(undated.into_iter().map(|(timestamp, real_aqi)| RawHistoryPoint {
            timestamp,
            real_aqi,
        }))
        .collect()
}

/// Averages repeated predictions for the same date and sorts by date.
///
/// Points with unparseable dates are appended unchanged.
pub fn dedupe_forecast(points: &[RawForecastPoint]) -> Vec<RawForecastPoint> {
    let (days, undated) = average_by_date(points.iter().map(|p| (p.date.as_str(), p.avg_aqi)));

    days.into_iter()
        .map(|(date, avg_aqi)| RawForecastPoint {
            date: date.format("%Y-%m-%d").to_string(),
            avg_aqi,
        })
        .chain(
            undated
                .into_iter()
                .map(|(date, avg_aqi)| RawForecastPoint { date, avg_aqi }),
        )
        .collect()
}

/// Rounds to two decimal places, as the dashboards display averages.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

type DailyAverages = (Vec<(NaiveDate, Option<f64>)>, Vec<(String, Option<f64>)>);

fn average_by_date<'a>(values: impl Iterator<Item = (&'a str, Option<f64>)>) -> DailyAverages {
    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    let mut undated = Vec::new();

    for (raw, value) in values {
        match parse_instant(raw) {
            Some(at) => {
                let slot = by_day.entry(at.date()).or_insert((0.0, 0));
                if let Some(v) = value {
                    slot.0 += v;
                    slot.1 += 1;
                }
            }
            None => undated.push((raw.to_string(), value)),
        }
    }

    let days = by_day
        .into_iter()
        .map(|(date, (sum, count))| {
            let avg = (count > 0).then(|| round2(sum / count as f64));
            (date, avg)
        })
        .collect();

    (days, undated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(timestamp: &str, real_aqi: Option<f64>) -> RawHistoryPoint {
        RawHistoryPoint {
            timestamp: timestamp.to_string(),
            real_aqi,
        }
    }

    fn prediction(date: &str, avg_aqi: Option<f64>) -> RawForecastPoint {
        RawForecastPoint {
            date: date.to_string(),
            avg_aqi,
        }
    }

    #[test]
    fn test_empty_inputs() {
        assert!(normalize_history(&[]).is_empty());
        assert!(normalize_forecast(&[]).is_empty());
        assert!(trend(&[], &[]).is_empty());
        assert!(daily_history(&[]).is_empty());
    }

    #[test]
    fn test_history_label_includes_time() {
        let points = normalize_history(&[reading("2024-01-01T00:00:00Z", Some(55.0))]);
        assert_eq!(points[0].label, "Mon, Jan 01 00:00");
        assert_eq!(points[0].value, Some(55.0));
        assert_eq!(points[0].kind, SeriesKind::Observed);
    }

    #[test]
    fn test_forecast_label_is_date_only() {
        let points = normalize_forecast(&[prediction("2024-01-02", Some(90.0))]);
        assert_eq!(points[0].label, "Tue, Jan 02");
        assert_eq!(points[0].kind, SeriesKind::Forecast);
    }

    #[test]
    fn test_history_preserves_length_and_order() {
        let input = vec![
            reading("2024-01-01T05:00:00", Some(70.0)),
            reading("2024-01-01T03:00:00", Some(60.0)),
            reading("2024-01-01T04:00:00", None),
        ];
        let points = normalize_history(&input);

        assert_eq!(points.len(), input.len());
        let values: Vec<_> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(70.0), Some(60.0), None]);
        assert_eq!(points[1].label, "Mon, Jan 01 03:00");
    }

    #[test]
    fn test_forecast_preserves_length_and_order() {
        let input = vec![
            prediction("2024-01-04", Some(120.0)),
            prediction("2024-01-02", None),
            prediction("2024-01-03", Some(75.5)),
        ];
        let points = normalize_forecast(&input);

        assert_eq!(points.len(), input.len());
        let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Thu, Jan 04", "Tue, Jan 02", "Wed, Jan 03"]);
        let values: Vec<_> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(120.0), None, Some(75.5)]);
    }

    #[test]
    fn test_missing_values_are_kept() {
        let points = normalize_forecast(&[prediction("2024-01-02", None)]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, None);
    }

    #[test]
    fn test_unparseable_timestamp_kept_verbatim() {
        let points = normalize_history(&[reading("yesterday", Some(10.0))]);
        assert_eq!(points[0].label, "yesterday");
    }

    #[test]
    fn test_parse_instant_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        assert_eq!(parse_instant("2024-03-05T07:30:00Z"), Some(expected));
        assert_eq!(parse_instant("2024-03-05T12:30:00+05:00"), Some(expected));
        assert_eq!(parse_instant("2024-03-05T07:30:00.000"), Some(expected));
        assert_eq!(parse_instant("2024-03-05 07:30:00"), Some(expected));
        assert_eq!(
            parse_instant("2024-03-05"),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_instant("not a date"), None);
    }

    #[test]
    fn test_trend_concatenates_history_then_forecast() {
        let points = trend(
            &[reading("2024-01-01T00:00:00Z", Some(55.0))],
            &[prediction("2024-01-02", Some(60.0)), prediction("2024-01-03", None)],
        );
        let kinds: Vec<_> = points.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![SeriesKind::Observed, SeriesKind::Forecast, SeriesKind::Forecast]
        );
    }

    #[test]
    fn test_daily_history_averages_and_sorts() {
        let daily = daily_history(&[
            reading("2024-01-02T01:00:00Z", Some(100.0)),
            reading("2024-01-01T01:00:00Z", Some(10.0)),
            reading("2024-01-01T02:00:00Z", Some(20.0)),
            reading("2024-01-01T03:00:00Z", None),
            reading("2024-01-02T02:00:00Z", Some(101.0)),
        ]);

        assert_eq!(
            daily,
            vec![
                reading("2024-01-01", Some(15.0)),
                reading("2024-01-02", Some(100.5)),
            ]
        );
    }

    #[test]
    fn test_daily_history_keeps_empty_day_and_undated_rows() {
        let daily = daily_history(&[
            reading("garbage", Some(1.0)),
            reading("2024-01-01T01:00:00Z", None),
        ]);
        assert_eq!(
            daily,
            vec![reading("2024-01-01", None), reading("garbage", Some(1.0))]
        );
    }

    #[test]
    fn test_daily_history_rounds_to_two_places() {
        let daily = daily_history(&[
            reading("2024-01-01T01:00:00Z", Some(1.0)),
            reading("2024-01-01T02:00:00Z", Some(1.0)),
            reading("2024-01-01T03:00:00Z", Some(2.0)),
        ]);
        assert_eq!(daily[0].real_aqi, Some(1.33));
    }

    #[test]
    fn test_dedupe_forecast() {
        let deduped = dedupe_forecast(&[
            prediction("2024-01-03T00:00:00", Some(90.0)),
            prediction("2024-01-02T00:00:00", Some(80.0)),
            prediction("2024-01-03T00:00:00", Some(100.0)),
        ]);
        assert_eq!(
            deduped,
            vec![
                prediction("2024-01-02", Some(80.0)),
                prediction("2024-01-03", Some(95.0)),
            ]
        );
    }
}
