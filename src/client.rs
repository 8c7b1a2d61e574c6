//! WeatherAPI forecast client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::config::DashboardConfig;
use crate::constants::{ERROR_BODY_LIMIT, USER_AGENT};
use crate::error::DashboardError;
use crate::models::ForecastDocument;

/// Anything that can turn a location query into a forecast document
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_forecast(&self, query: &str) -> Result<ForecastDocument, DashboardError>;
}

/// HTTP client for WeatherAPI's `forecast.json`
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
    api_key: String,
    days: u8,
}

impl ForecastClient {
    pub fn new(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DashboardError::config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            days: config.forecast_days,
        })
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast.json", self.base_url)
    }
}

#[async_trait]
impl ForecastSource for ForecastClient {
    #[instrument(skip(self))]
    async fn fetch_forecast(&self, query: &str) -> Result<ForecastDocument, DashboardError> {
        let url = self.forecast_url();
        let days = self.days.to_string();
        debug!(url = %url, "Fetching forecast");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("days", days.as_str()),
                ("aqi", "yes"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .map_err(|e| DashboardError::transport(None, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::transport(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(DashboardError::transport(Some(status.as_u16()), excerpt));
        }

        let document = ForecastDocument::from_json(&body)?;
        info!(
            location = %document.location.name,
            days = document.forecast_days.len(),
            "Forecast received"
        );
        Ok(document)
    }
}
