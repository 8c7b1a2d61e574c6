//! Integration tests for the WeatherAPI forecast client using WireMock
//!
//! These tests mock `forecast.json` to verify request shape and error
//! classification without a network connection or API key.

use std::sync::Arc;
use std::time::Duration;

use weather_dashboard::board::{ChartBoard, SceneBoard};
use weather_dashboard::classifier::SceneCategory;
use weather_dashboard::client::{ForecastClient, ForecastSource};
use weather_dashboard::geolocation::FixedPosition;
use weather_dashboard::{Dashboard, DashboardConfig, DashboardError, FetchOutcome, Surfaces};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn config_for_mock(base_url: &str) -> DashboardConfig {
    let mut config = DashboardConfig::with_api_key("test-key");
    config.base_url = format!("{base_url}/v1");
    config.timeout_secs = 5;
    config
}

/// Minimal forecast.json body for a snowy afternoon
fn forecast_response() -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": "Reykjavik",
            "region": "Capital Region",
            "country": "Iceland",
            "localtime": "2025-01-10 14:30"
        },
        "current": {
            "last_updated": "2025-01-10 14:15",
            "temp_c": -2.0,
            "temp_f": 28.4,
            "is_day": 1,
            "condition": {"text": "Moderate snow"},
            "wind_kph": 18.0,
            "air_quality": {"pm2_5": 3.1, "us-epa-index": 1}
        },
        "forecast": {
            "forecastday": [{
                "date": "2025-01-10",
                "day": {"avgtemp_c": -1.5, "avgtemp_f": 29.3, "condition": {"text": "Snow"}},
                "hour": [
                    {"time": "2025-01-10 14:00", "temp_c": -2.0, "temp_f": 28.4},
                    {"time": "2025-01-10 15:00", "temp_c": -2.4, "temp_f": 27.7}
                ]
            }]
        }
    })
}

async fn mount_forecast(server: &MockServer, query: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", query))
        .and(query_param("days", "5"))
        .and(query_param("aqi", "yes"))
        .and(query_param("alerts", "no"))
        .respond_with(response)
        .mount(server)
        .await;
}

// =============================================================================
// Forecast Client
// =============================================================================

#[tokio::test]
async fn test_fetch_forecast_success() {
    let server = MockServer::start().await;
    mount_forecast(
        &server,
        "Reykjavik",
        ResponseTemplate::new(200).set_body_json(forecast_response()),
    )
    .await;

    let client = ForecastClient::new(&config_for_mock(&server.uri())).expect("client");
    let document = client
        .fetch_forecast("Reykjavik")
        .await
        .expect("fetch should succeed");

    assert_eq!(document.location.name, "Reykjavik");
    assert_eq!(document.current.temp_c, Some(-2.0));
    assert_eq!(document.forecast_days.len(), 1);
    assert_eq!(document.hours().count(), 2);
}

#[tokio::test]
async fn test_fetch_forecast_api_error_keeps_status_and_excerpt() {
    let server = MockServer::start().await;
    let body = format!(
        r#"{{"error":{{"code":1006,"message":"No matching location found."}},"pad":"{}"}}"#,
        "x".repeat(400)
    );
    mount_forecast(&server, "Atlantis", ResponseTemplate::new(400).set_body_string(body.clone()))
        .await;

    let client = ForecastClient::new(&config_for_mock(&server.uri())).expect("client");
    let err = client.fetch_forecast("Atlantis").await.unwrap_err();

    match err {
        DashboardError::Transport { status, message } => {
            assert_eq!(status, Some(400));
            assert_eq!(message.chars().count(), 200);
            assert!(body.starts_with(&message));
            assert!(message.contains("No matching location found."));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_forecast_rejects_invalid_json() {
    let server = MockServer::start().await;
    mount_forecast(
        &server,
        "London",
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let client = ForecastClient::new(&config_for_mock(&server.uri())).expect("client");
    let err = client.fetch_forecast("London").await.unwrap_err();
    assert!(matches!(err, DashboardError::Parse { .. }));
}

#[tokio::test]
async fn test_fetch_forecast_requires_current_section() {
    let server = MockServer::start().await;
    let mut body = forecast_response();
    body.as_object_mut().expect("object").remove("current");
    mount_forecast(&server, "London", ResponseTemplate::new(200).set_body_json(body)).await;

    let client = ForecastClient::new(&config_for_mock(&server.uri())).expect("client");
    let err = client.fetch_forecast("London").await.unwrap_err();
    assert_eq!(err, DashboardError::parse("missing `current`"));
}

#[tokio::test]
async fn test_fetch_forecast_connection_refused() {
    let server = MockServer::start().await;
    let config = config_for_mock(&server.uri());
    drop(server);

    let client = ForecastClient::new(&config).expect("client");
    let err = client.fetch_forecast("London").await.unwrap_err();
    assert!(matches!(err, DashboardError::Transport { status: None, .. }));
    assert!(err.to_string().starts_with("API error (no response)"));
}

// =============================================================================
// Dashboard over HTTP
// =============================================================================

#[tokio::test]
async fn test_dashboard_search_over_http() {
    let server = MockServer::start().await;
    mount_forecast(
        &server,
        "Reykjavik",
        ResponseTemplate::new(200).set_body_json(forecast_response()),
    )
    .await;

    let client = ForecastClient::new(&config_for_mock(&server.uri())).expect("client");
    let scene = Arc::new(SceneBoard::new());
    let temperature = Arc::new(ChartBoard::new());
    let dashboard = Dashboard::new(
        Arc::new(client),
        Arc::new(FixedPosition::new(None)),
        Surfaces {
            scene: scene.clone(),
            temperature_chart: temperature.clone(),
            pollutant_chart: Arc::new(ChartBoard::new()),
        },
        Duration::from_secs(1),
    );

    let outcome = dashboard.search("Reykjavik").await.expect("fetch should succeed");
    assert_eq!(outcome, FetchOutcome::Applied);
    assert_eq!(dashboard.scene().category(), Some(SceneCategory::Snow));
    assert_eq!(scene.snapshot().backdrop, Some(SceneCategory::Snow));

    let view = dashboard.view();
    let fields = view.fields.expect("fields projected");
    assert_eq!(fields.place, "Reykjavik, Capital Region, Iceland");
    assert_eq!(fields.temperature, "-2°C");
    assert_eq!(fields.air_quality.summary, "AQI: Good");
    assert_eq!(view.cards[0].label, "Today");

    // Two hours is under the rolling minimum, so the first hours are used.
    let chart = temperature.current().expect("temperature chart drawn");
    assert_eq!(chart.labels, vec!["14:00".to_string(), "15:00".to_string()]);

    dashboard.shutdown();
    assert_eq!(dashboard.scene().live_elements(), 0);
}
