pub mod cards;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod metrics_table;
pub mod models;
pub mod normalize;
pub mod output;
pub mod services;
pub mod severity;
