//! Summary cards: today's average and the next few forecast days.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{RawForecastPoint, RawHistoryPoint};
use crate::normalize::{parse_instant, round2};
use crate::severity::{SeverityLevel, classify_optional};

/// One day's headline AQI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiCard {
    /// Full weekday name, e.g. `"Monday"`.
    pub weekday: String,
    /// Long date, e.g. `"January 01, 2024"`.
    pub date: String,
    pub value: Option<f64>,
    pub severity: Option<SeverityLevel>,
}

impl AqiCard {
    fn new(day: NaiveDate, value: Option<f64>) -> Self {
        AqiCard {
            weekday: day.format("%A").to_string(),
            date: day.format("%B %d, %Y").to_string(),
            value,
            severity: classify_optional(value),
        }
    }
}

/// Cards for the first `n` forecast points whose date parses.
pub fn forecast_cards(points: &[RawForecastPoint], n: usize) -> Vec<AqiCard> {
    points
        .iter()
        .filter_map(|p| parse_instant(&p.date).map(|at| AqiCard::new(at.date(), p.avg_aqi)))
        .take(n)
        .collect()
}

/// Average of the present readings taken on `day`, rounded to two places.
pub fn today_average(points: &[RawHistoryPoint], day: NaiveDate) -> Option<f64> {
    let values: Vec<f64> = points
        .iter()
        .filter(|p| parse_instant(&p.timestamp).is_some_and(|at| at.date() == day))
        .filter_map(|p| p.real_aqi)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(round2(values.iter().sum::<f64>() / values.len() as f64))
    }
}

/// The card for `day` built from hourly history.
pub fn today_card(points: &[RawHistoryPoint], day: NaiveDate) -> AqiCard {
    AqiCard::new(day, today_average(points, day))
}
