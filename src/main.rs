//! CLI entry point for the AQI dashboard.
//!
//! Reads model metrics, forecasts and history from the AQI backend and
//! renders them as tables, cards and chart series.

use aqi_dashboard::cards::{AqiCard, forecast_cards, today_card};
use aqi_dashboard::config::{DEFAULT_BASE_URL, DashboardConfig};
use aqi_dashboard::dashboard::{Applied, Dashboard, LoadTimes};
use aqi_dashboard::infra::backend::BackendClient;
use aqi_dashboard::metrics_table::MetricsRow;
use aqi_dashboard::normalize::{ChartPoint, daily_history, dedupe_forecast, normalize_history};
use aqi_dashboard::output::{
    append_chart_points, loaded_note, render_cards, render_chart, render_levels,
    render_metrics_table, to_json,
};
use aqi_dashboard::services::dashboard_api::DashboardApi;
use aqi_dashboard::severity::classify;
use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aqi_dashboard")]
#[command(about = "Air-quality dashboard for the AQI forecast backend", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "AQI_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// JSON config file with a `base_url` key (overrides --base-url)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's model performance table
    Metrics {
        #[arg(long)]
        json: bool,
    },
    /// Show the upcoming forecast as daily cards
    Forecast {
        /// Number of forecast days to show
        #[arg(short = 'n', long, default_value_t = 3)]
        cards: usize,

        #[arg(long)]
        json: bool,
    },
    /// Show observed AQI history
    History {
        /// Days of history to request
        #[arg(short, long, default_value_t = 4)]
        days: u32,

        /// Collapse hourly readings to daily averages
        #[arg(long)]
        daily: bool,

        #[arg(long)]
        json: bool,
    },
    /// Load every source concurrently and show the full dashboard
    Dashboard {
        #[arg(short, long, default_value_t = 4)]
        days: u32,

        #[arg(long)]
        json: bool,
    },
    /// Classify an AQI value
    Classify {
        #[arg(allow_negative_numbers = true)]
        aqi: f64,
    },
    /// Print the EPA AQI levels
    Levels,
    /// Append the history + forecast trend to a CSV file
    Export {
        #[arg(short, long, default_value_t = 4)]
        days: u32,

        #[arg(short, long, default_value = "aqi_trend.csv")]
        output: String,
    },
}

#[derive(Serialize)]
struct DashboardView {
    metrics: Vec<MetricsRow>,
    today: AqiCard,
    forecast: Vec<AqiCard>,
    trend: Vec<ChartPoint>,
    loaded_at: LoadTimes,
    errors: Vec<SourceError>,
}

#[derive(Serialize)]
struct SourceError {
    source: &'static str,
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aqi_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aqi_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let base_url = cli.base_url;
    let config_path = cli.config;
    let connect = || -> Result<Dashboard<BackendClient>> {
        let config = DashboardConfig::resolve(config_path.as_deref(), &base_url)?;
        info!(base_url = config.base_url(), "Using AQI backend");
        Ok(Dashboard::new(BackendClient::new(config)?))
    };

    match cli.command {
        Commands::Metrics { json } => {
            let dashboard = connect()?;
            dashboard.load_metrics().await;
            let rows = dashboard.metrics_rows();
            if json {
                println!("{}", to_json(&rows)?);
            } else {
                if !rows.iter().any(|r| r.is_production) {
                    warn!("No production model metrics available");
                }
                print!("{}", render_metrics_table(&rows));
            }
            report_errors(&dashboard);
        }
        Commands::Forecast { cards, json } => {
            let dashboard = connect()?;
            dashboard.load_forecast().await;
            let cards = forecast_cards(&dedupe_forecast(&dashboard.forecast_points()), cards);
            if json {
                println!("{}", to_json(&cards)?);
            } else {
                print!("{}", render_cards(&cards));
            }
            report_errors(&dashboard);
        }
        Commands::History { days, daily, json } => {
            let dashboard = connect()?;
            dashboard.load_history(days).await;
            let mut history = dashboard.history_points();
            if daily {
                history = daily_history(&history);
            }
            let points = normalize_history(&history);
            if json {
                println!("{}", to_json(&points)?);
            } else {
                print!("{}", render_chart(&points));
            }
            report_errors(&dashboard);
        }
        Commands::Dashboard { days, json } => {
            let dashboard = connect()?;
            dashboard.load_all(days).await;
            let view = dashboard_view(&dashboard);
            if json {
                println!("{}", to_json(&view)?);
            } else {
                print_dashboard(&view);
                report_errors(&dashboard);
            }
        }
        Commands::Classify { aqi } => {
            let level = classify(aqi);
            println!("{} ({}) {}", level.label(), level.color(), level.description());
        }
        Commands::Levels => {
            print!("{}", render_levels());
        }
        Commands::Export { days, output } => {
            let dashboard = connect()?;
            let report = dashboard.load_all(days).await;
            if report.history != Applied::Updated && report.forecast != Applied::Updated {
                bail!("Nothing to export: history and forecast both failed to load");
            }
            let trend = dashboard.trend_chart();
            append_chart_points(&output, &trend)?;
            info!(path = %output, rows = trend.len(), "Trend exported");
            report_errors(&dashboard);
        }
    }

    Ok(())
}

/// Prints a one-line notice for every source that failed to load.
fn report_errors<A: DashboardApi>(dashboard: &Dashboard<A>) {
    for (source, message) in dashboard.errors() {
        eprintln!("{source} unavailable: {message}");
    }
}

fn dashboard_view<A: DashboardApi>(dashboard: &Dashboard<A>) -> DashboardView {
    let history = dashboard.history_points();
    let forecast = dedupe_forecast(&dashboard.forecast_points());

    DashboardView {
        metrics: dashboard.metrics_rows(),
        today: today_card(&history, Utc::now().date_naive()),
        forecast: forecast_cards(&forecast, 3),
        trend: dashboard.trend_chart(),
        loaded_at: dashboard.load_times(),
        errors: dashboard
            .errors()
            .into_iter()
            .map(|(source, message)| SourceError { source, message })
            .collect(),
    }
}

fn print_dashboard(view: &DashboardView) {
    println!("Current air quality{}", loaded_note(view.loaded_at.history));
    print!("{}", render_cards(std::slice::from_ref(&view.today)));
    println!();
    println!("Forecast{}", loaded_note(view.loaded_at.forecast));
    print!("{}", render_cards(&view.forecast));
    println!();
    println!("Model performance{}", loaded_note(view.loaded_at.metrics));
    print!("{}", render_metrics_table(&view.metrics));
    println!();
    println!("AQI trend{}", loaded_note(view.loaded_at.history));
    print!("{}", render_chart(&view.trend));
}
