use anyhow::Result;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_dashboard::{DashboardConfig, WeatherDashboard};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(version = weather_dashboard::VERSION, "Starting weather dashboard");

    let config = DashboardConfig::from_env()?;
    let weather = WeatherDashboard::new(&config)?;
    let dashboard = weather.dashboard().clone();

    // Startup search; a failure only leaves the status set.
    if let Err(e) = dashboard.search(&config.default_query).await {
        tracing::warn!("Initial forecast for {} failed: {}", config.default_query, e);
    }

    let server = weather.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    dashboard.shutdown();
    tracing::info!("Server shutdown complete");
    Ok(())
}
