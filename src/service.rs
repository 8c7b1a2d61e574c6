use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use std::sync::Arc;
use std::time::Duration;

use crate::board::{ChartBoard, SceneBoard};
use crate::client::ForecastClient;
use crate::config::DashboardConfig;
use crate::dashboard::{Dashboard, FetchOutcome, Surfaces};
use crate::error::DashboardError;
use crate::formatters::{format_chart, format_dashboard, format_scene};
use crate::geolocation::FixedPosition;
use crate::models::{LocateRequest, SearchRequest, SelectDayRequest};

/// MCP front end for the dashboard; each tool is one user action
#[derive(Clone)]
pub struct WeatherDashboard {
    dashboard: Arc<Dashboard>,
    scene_board: Arc<SceneBoard>,
    temperature_board: Arc<ChartBoard>,
    pollutant_board: Arc<ChartBoard>,
    tool_router: ToolRouter<Self>,
}

/// Maps a failed action to the MCP error the client sees
fn to_mcp_error(err: DashboardError) -> McpError {
    match err {
        DashboardError::Validation { .. }
        | DashboardError::Geolocation { .. }
        | DashboardError::GeolocationUnsupported => {
            McpError::invalid_params(err.user_message(), None)
        }
        _ => McpError::internal_error(err.user_message(), None),
    }
}

fn text(body: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(body)])
}

impl WeatherDashboard {
    /// Creates a service drawing on fresh in-memory boards
    pub fn new(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let client = ForecastClient::new(config)?;
        let positions = FixedPosition::from_config(config.position.as_deref())?;
        let scene_board = Arc::new(SceneBoard::new());
        let temperature_board = Arc::new(ChartBoard::new());
        let pollutant_board = Arc::new(ChartBoard::new());

        let dashboard = Dashboard::new(
            Arc::new(client),
            Arc::new(positions),
            Surfaces {
                scene: scene_board.clone(),
                temperature_chart: temperature_board.clone(),
                pollutant_chart: pollutant_board.clone(),
            },
            Duration::from_secs(config.geolocation_timeout_secs),
        );

        Ok(Self::with_dashboard(
            Arc::new(dashboard),
            scene_board,
            temperature_board,
            pollutant_board,
        ))
    }

    /// Wraps a dashboard that already draws on the given boards
    pub fn with_dashboard(
        dashboard: Arc<Dashboard>,
        scene_board: Arc<SceneBoard>,
        temperature_board: Arc<ChartBoard>,
        pollutant_board: Arc<ChartBoard>,
    ) -> Self {
        Self {
            dashboard,
            scene_board,
            temperature_board,
            pollutant_board,
            tool_router: Self::tool_router(),
        }
    }

    pub fn dashboard(&self) -> &Arc<Dashboard> {
        &self.dashboard
    }

    /// Renders the dashboard after a fetch, noting superseded requests
    fn after_fetch(&self, outcome: FetchOutcome) -> String {
        let view = format_dashboard(&self.dashboard.view());
        match outcome {
            FetchOutcome::Applied => view,
            FetchOutcome::Stale => format!("A newer request replaced this one.\n\n{view}"),
        }
    }

    fn scene_text(&self) -> String {
        format_scene(&self.scene_board.snapshot(), &self.dashboard.scene().effect_kinds())
    }

    fn charts_text(&self) -> String {
        let charts: Vec<String> = [&self.temperature_board, &self.pollutant_board]
            .into_iter()
            .filter_map(|board| board.current())
            .map(|chart| format_chart(&chart))
            .collect();
        if charts.is_empty() {
            "No charts drawn yet.\n".to_string()
        } else {
            charts.join("\n")
        }
    }
}

#[tool_handler]
impl ServerHandler for WeatherDashboard {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "weather-dashboard".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: Some("Weather Dashboard".to_string()),
                website_url: None,
            },
            instructions: Some(
                "An animated weather dashboard powered by WeatherAPI. Search a location, \
                then inspect current conditions, air quality, a multi-day forecast, hourly \
                charts and the animated scene."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl WeatherDashboard {
    /// Submits the search field
    #[tool(description = "Search for a location and show its forecast. Accepts a city name (e.g., 'London'), a postcode, or 'lat,lon' coordinates.")]
    async fn search_location(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Searching for location: {}", request.query);

        let outcome = self
            .dashboard
            .search(&request.query)
            .await
            .map_err(to_mcp_error)?;
        Ok(text(self.after_fetch(outcome)))
    }

    #[tool(description = "Show the forecast for the device's position. Pass latitude and longitude to report a position; omit both to use the configured one.")]
    async fn use_my_location(
        &self,
        Parameters(request): Parameters<LocateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = match (request.latitude, request.longitude) {
            (Some(latitude), Some(longitude)) => {
                tracing::info!("Using reported position: {}, {}", latitude, longitude);
                self.dashboard.locate_at(latitude, longitude).await
            }
            (None, None) => self.dashboard.locate().await,
            _ => Err(DashboardError::validation(
                "Provide both latitude and longitude, or neither",
            )),
        }
        .map_err(to_mcp_error)?;
        Ok(text(self.after_fetch(outcome)))
    }

    #[tool(description = "Show the forecast for a randomly chosen sample city.")]
    async fn random_location(&self) -> Result<CallToolResult, McpError> {
        let outcome = self.dashboard.random_location().await.map_err(to_mcp_error)?;
        Ok(text(self.after_fetch(outcome)))
    }

    #[tool(description = "Clear the search field and any status message.")]
    async fn clear_input(&self) -> Result<CallToolResult, McpError> {
        self.dashboard.clear_input();
        Ok(text(format_dashboard(&self.dashboard.view())))
    }

    #[tool(description = "Switch between Celsius and Fahrenheit. Redraws from the loaded forecast without fetching again.")]
    async fn toggle_units(&self) -> Result<CallToolResult, McpError> {
        let unit = self.dashboard.toggle_unit().map_err(to_mcp_error)?;
        tracing::info!("Units switched to °{}", unit.symbol());
        Ok(text(format_dashboard(&self.dashboard.view())))
    }

    #[tool(description = "Scope the hourly charts to one forecast day. Index 0 is today.")]
    async fn select_day(
        &self,
        Parameters(request): Parameters<SelectDayRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dashboard
            .select_day(request.index)
            .map_err(to_mcp_error)?;
        Ok(text(format_dashboard(&self.dashboard.view())))
    }

    #[tool(description = "Show the current dashboard: conditions, air quality, forecast cards and hourly data.")]
    async fn show_dashboard(&self) -> Result<CallToolResult, McpError> {
        Ok(text(format_dashboard(&self.dashboard.view())))
    }

    #[tool(description = "Show the animated scene: backdrop, weather art, running effects and live particles.")]
    async fn show_scene(&self) -> Result<CallToolResult, McpError> {
        Ok(text(self.scene_text()))
    }

    #[tool(description = "Show the temperature and pollutant charts as drawn.")]
    async fn show_charts(&self) -> Result<CallToolResult, McpError> {
        Ok(text(self.charts_text()))
    }
}
