//! Dashboard configuration
//!
//! The only real settings are the WeatherAPI credential and endpoint; the rest
//! have defaults matching the browser dashboard.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_QUERY, WEATHER_API_BASE};
use crate::error::DashboardError;

/// API key baked in at build time, if any
const BUILD_API_KEY: Option<&str> = option_env!("WEATHER_API_KEY");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// WeatherAPI key
    pub api_key: String,

    /// WeatherAPI base URL (default: <https://api.weatherapi.com/v1>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of forecast days requested (default: 5)
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    /// HTTP timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Query fetched at startup (default: London)
    #[serde(default = "default_query")]
    pub default_query: String,

    /// How long to wait for a device position (default: 10)
    #[serde(default = "default_geolocation_timeout")]
    pub geolocation_timeout_secs: u64,

    /// Device position as `"lat,lon"`, reported by the position provider
    #[serde(default)]
    pub position: Option<String>,
}

fn default_base_url() -> String {
    WEATHER_API_BASE.to_string()
}

const fn default_forecast_days() -> u8 {
    5
}

const fn default_timeout() -> u64 {
    30
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

const fn default_geolocation_timeout() -> u64 {
    10
}

impl DashboardConfig {
    /// Config with defaults and the given key
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            forecast_days: default_forecast_days(),
            timeout_secs: default_timeout(),
            default_query: default_query(),
            geolocation_timeout_secs: default_geolocation_timeout(),
            position: None,
        }
    }

    /// Load from `WEATHER_*` environment variables.
    ///
    /// `WEATHER_API_KEY` falls back to the key compiled into the binary.
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("WEATHER_API_KEY")
            .or_else(|| BUILD_API_KEY.map(str::to_string))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DashboardError::config("WEATHER_API_KEY is not set"))?;

        let mut config = Self::with_api_key(api_key);
        if let Some(base_url) = lookup("WEATHER_API_BASE") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(query) = lookup("WEATHER_DEFAULT_QUERY") {
            config.default_query = query;
        }
        if let Some(secs) = lookup("WEATHER_TIMEOUT_SECS") {
            config.timeout_secs = secs
                .parse()
                .map_err(|e| DashboardError::config(format!("WEATHER_TIMEOUT_SECS: {e}")))?;
        }
        config.position = lookup("WEATHER_POSITION");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::with_api_key("abc");
        assert_eq!(config.base_url, "https://api.weatherapi.com/v1");
        assert_eq!(config.forecast_days, 5);
        assert_eq!(config.default_query, "London");
        assert_eq!(config.geolocation_timeout_secs, 10);
        assert!(config.position.is_none());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("WEATHER_API_KEY", "secret"),
            ("WEATHER_API_BASE", "http://localhost:9000/v1/"),
            ("WEATHER_DEFAULT_QUERY", "Tokyo"),
            ("WEATHER_POSITION", "51.5074,-0.1278"),
        ]))
        .expect("config should load");

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.default_query, "Tokyo");
        assert_eq!(config.position.as_deref(), Some("51.5074,-0.1278"));
    }

    #[test]
    fn test_rejects_bad_timeout() {
        let result = DashboardConfig::from_lookup(lookup_from(&[
            ("WEATHER_API_KEY", "secret"),
            ("WEATHER_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(DashboardError::Config { .. })));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"api_key":"k"}"#).expect("should deserialize");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.default_query, "London");
    }
}
