//! Weather dashboard served over MCP
//!
//! Fetches WeatherAPI forecasts, classifies current conditions into a scene,
//! and projects metrics, day cards and hourly charts onto drawing surfaces.

pub mod board;
pub mod charts;
pub mod classifier;
pub mod client;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod formatters;
pub mod geolocation;
pub mod metrics;
pub mod models;
pub mod scene;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, FetchOutcome, Surfaces};
pub use error::DashboardError;
pub use service::WeatherDashboard;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
