//! Shared fixtures for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::client::ForecastSource;
use crate::error::DashboardError;
use crate::models::ForecastDocument;

const DATES: [&str; 3] = ["2025-08-17", "2025-08-18", "2025-08-19"];

fn hours_for(date: &str) -> Vec<serde_json::Value> {
    (0..24)
        .map(|h: u32| {
            let temp_c = 12.0 + f64::from(h) / 2.0;
            serde_json::json!({
                "time": format!("{date} {h:02}:00"),
                "temp_c": temp_c,
                "temp_f": temp_c * 9.0 / 5.0 + 32.0,
                "air_quality": {"pm2_5": 5.0 + f64::from(h), "pm10": 0.0}
            })
        })
        .collect()
}

/// A three-day WeatherAPI response for `name`
pub(crate) fn sample_document(name: &str, condition: &str, is_day: u8) -> ForecastDocument {
    let days: Vec<serde_json::Value> = DATES
        .iter()
        .map(|date| {
            serde_json::json!({
                "date": date,
                "day": {
                    "avgtemp_c": 17.4,
                    "avgtemp_f": 63.3,
                    "condition": {"text": condition},
                    "totalprecip_mm": 0.6
                },
                "hour": hours_for(date)
            })
        })
        .collect();

    let body = serde_json::json!({
        "location": {
            "name": name,
            "region": "",
            "country": "Somewhere",
            "localtime": "2025-08-17 9:05"
        },
        "current": {
            "last_updated": "2025-08-17 09:00",
            "temp_c": 17.0,
            "temp_f": 62.6,
            "feelslike_c": 16.4,
            "feelslike_f": 61.5,
            "is_day": is_day,
            "condition": {"text": condition},
            "humidity": 77,
            "wind_kph": 11.2,
            "wind_dir": "SW",
            "vis_km": 10.0,
            "pressure_mb": 1016.0,
            "uv": 3.0,
            "air_quality": {"pm2_5": 40.26, "pm10": 52.1, "us-epa-index": 2}
        },
        "forecast": {"forecastday": days}
    });

    match ForecastDocument::from_json(&body.to_string()) {
        Ok(document) => document,
        Err(err) => panic!("fixture should parse: {err}"),
    }
}

/// Forecast source answering from a fixed table, optionally holding some
/// queries until released
#[derive(Default)]
pub(crate) struct ScriptedSource {
    responses: HashMap<String, Result<ForecastDocument, DashboardError>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(
        mut self,
        query: &str,
        response: Result<ForecastDocument, DashboardError>,
    ) -> Self {
        self.responses.insert(query.to_string(), response);
        self
    }

    /// Hold `query` until the returned sender fires
    pub(crate) fn gated(self, query: &str) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .insert(query.to_string(), rx);
        (self, tx)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) async fn wait_for_calls(&self, count: usize) {
        while self.calls() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl ForecastSource for ScriptedSource {
    async fn fetch_forecast(&self, query: &str) -> Result<ForecastDocument, DashboardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().remove(query);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.responses.get(query).cloned().unwrap_or_else(|| {
            Err(DashboardError::transport(
                Some(400),
                "No matching location found.",
            ))
        })
    }
}
