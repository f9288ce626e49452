//! View state for the three independent data sources.
//!
//! Each source owns its own slot. Loads are tagged with a ticket from a
//! monotonic counter; an outcome (success or failure) is applied only if no
//! newer ticket for the same source has completed already, so a slow response
//! for an old parameter can neither overwrite fresher data nor mask or invent
//! an error. Failures are logged and leave the previous data in place.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

use crate::error::FetchError;
use crate::metrics_table::{MetricsRow, build_metrics_rows};
use crate::models::{MetricsSnapshot, RawForecastPoint, RawHistoryPoint};
use crate::normalize::{ChartPoint, normalize_forecast, normalize_history, trend};
use crate::services::dashboard_api::DashboardApi;

/// Identifies one in-flight load of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What [`SourceState::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// A newer load already completed; this outcome was dropped.
    Stale,
    /// The load failed; previous data kept.
    Failed,
}

#[derive(Debug)]
struct Slot<T> {
    data: Option<T>,
    /// Newest ticket whose outcome was applied, success or failure.
    completed: u64,
    last_error: Option<String>,
    loaded_at: Option<DateTime<Utc>>,
}

/// Loading state of a single data source.
#[derive(Debug)]
pub struct SourceState<T> {
    name: &'static str,
    issued: AtomicU64,
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> SourceState<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            issued: AtomicU64::new(0),
            slot: Mutex::new(Slot {
                data: None,
                completed: 0,
                last_error: None,
                loaded_at: None,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Issues the ticket for a new load.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Applies the outcome of the load identified by `ticket`.
    pub fn complete(&self, ticket: Ticket, result: Result<T, FetchError>) -> Applied {
        let mut slot = self.lock();
        if ticket.0 < slot.completed {
            debug!(
                source = self.name,
                ticket = ticket.0,
                ok = result.is_ok(),
                "Dropping stale outcome"
            );
            return Applied::Stale;
        }
        slot.completed = ticket.0;

        match result {
            Ok(data) => {
                slot.data = Some(data);
                slot.last_error = None;
                slot.loaded_at = Some(Utc::now());
                Applied::Updated
            }
            Err(e) => {
                error!(source = self.name, kind = e.kind(), error = %e, "Load failed");
                slot.last_error = Some(e.to_string());
                Applied::Failed
            }
        }
    }

    /// The last successfully loaded data, if any.
    pub fn data(&self) -> Option<T> {
        self.lock().data.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.lock().loaded_at
    }

    // Never held across an await; a poisoned lock still holds valid data.
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The dashboard's view state over some [`DashboardApi`].
pub struct Dashboard<A> {
    api: A,
    metrics: SourceState<MetricsSnapshot>,
    forecast: SourceState<Vec<RawForecastPoint>>,
    history: SourceState<Vec<RawHistoryPoint>>,
}

impl<A: DashboardApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            metrics: SourceState::new("metrics"),
            forecast: SourceState::new("forecast"),
            history: SourceState::new("history"),
        }
    }

    pub async fn load_metrics(&self) -> Applied {
        let ticket = self.metrics.begin();
        let result = self.api.latest_metrics().await;
        self.metrics.complete(ticket, result)
    }

    pub async fn load_forecast(&self) -> Applied {
        let ticket = self.forecast.begin();
        let result = self.api.forecast().await;
        self.forecast.complete(ticket, result)
    }

    /// Loads the last `days` of history. Re-issuing with a different window
    /// supersedes earlier loads still in flight.
    pub async fn load_history(&self, days: u32) -> Applied {
        let ticket = self.history.begin();
        let result = self.api.history(days).await;
        self.history.complete(ticket, result)
    }

    /// Loads all three sources concurrently. One failing does not affect the
    /// others.
    #[tracing::instrument(skip(self))]
    pub async fn load_all(&self, days: u32) -> LoadReport {
        let (metrics, forecast, history) = tokio::join!(
            self.load_metrics(),
            self.load_forecast(),
            self.load_history(days)
        );
        let report = LoadReport {
            metrics,
            forecast,
            history,
        };
        info!(?report, "Dashboard load finished");
        report
    }

    pub fn metrics_rows(&self) -> Vec<MetricsRow> {
        self.metrics
            .data()
            .map(|snapshot| build_metrics_rows(&snapshot))
            .unwrap_or_default()
    }

    pub fn forecast_points(&self) -> Vec<RawForecastPoint> {
        self.forecast.data().unwrap_or_default()
    }

    pub fn history_points(&self) -> Vec<RawHistoryPoint> {
        self.history.data().unwrap_or_default()
    }

    pub fn forecast_chart(&self) -> Vec<ChartPoint> {
        normalize_forecast(&self.forecast_points())
    }

    pub fn history_chart(&self) -> Vec<ChartPoint> {
        normalize_history(&self.history_points())
    }

    /// History followed by forecast, from whatever each source last loaded.
    pub fn trend_chart(&self) -> Vec<ChartPoint> {
        trend(&self.history_points(), &self.forecast_points())
    }

    /// When each source last loaded successfully.
    pub fn load_times(&self) -> LoadTimes {
        LoadTimes {
            metrics: self.metrics.loaded_at(),
            forecast: self.forecast.loaded_at(),
            history: self.history.loaded_at(),
        }
    }

    /// `(source, message)` for every source whose last load failed.
    pub fn errors(&self) -> Vec<(&'static str, String)> {
        [
            (self.metrics.name(), self.metrics.last_error()),
            (self.forecast.name(), self.forecast.last_error()),
            (self.history.name(), self.history.last_error()),
        ]
        .into_iter()
        .filter_map(|(name, err)| err.map(|e| (name, e)))
        .collect()
    }
}

/// Time of the last successful load of each source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadTimes {
    pub metrics: Option<DateTime<Utc>>,
    pub forecast: Option<DateTime<Utc>>,
    pub history: Option<DateTime<Utc>>,
}

/// Per-source outcome of [`Dashboard::load_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub metrics: Applied,
    pub forecast: Applied,
    pub history: Applied,
}
