//! Input controller and display state
//!
//! One [`Dashboard`] owns the display state and every rendering component.
//! User actions go through it; each fetch takes a ticket from a monotonically
//! increasing counter, and a response is only applied if its ticket is still
//! the latest one issued.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::charts::{build_day_cards, build_hourly_series, ChartSurface, DayCard, HourlySeries};
use crate::classifier::{classify_current, SceneCategory};
use crate::client::ForecastSource;
use crate::constants::SAMPLE_LOCATIONS;
use crate::error::DashboardError;
use crate::geolocation::{locate_with_timeout, Position, PositionProvider};
use crate::metrics::{project, DisplayFields};
use crate::models::{ForecastDocument, Unit};
use crate::scene::{SceneRenderer, SceneSurface};

const LOADING_STATUS: &str = "Loading forecast…";

/// Process-wide display state, mutated only through [`Dashboard`]
#[derive(Debug, Default)]
pub struct DisplayState {
    pub unit: Unit,
    pub document: Option<Arc<ForecastDocument>>,
    /// Wall-clock time the current document was applied
    pub fetched_at: Option<DateTime<Local>>,
    pub last_query: Option<String>,
    /// Contents of the search field
    pub input: String,
    /// `None` shows the rolling 24-hour window
    pub selected_day: Option<usize>,
    pub status: String,
    latest_ticket: u64,
}

impl DisplayState {
    /// Day card drawn as selected; today unless the user picked another
    pub fn highlighted_day(&self) -> usize {
        self.selected_day.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer request was issued while this one was in flight
    Stale,
}

/// Everything the dashboard shows, projected from the state
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub status: String,
    pub input: String,
    pub unit: Unit,
    pub fields: Option<DisplayFields>,
    pub cards: Vec<DayCard>,
    pub highlighted_day: usize,
    pub series: Option<HourlySeries>,
    pub scene: Option<SceneCategory>,
}

/// Rendering surfaces the dashboard draws on
pub struct Surfaces {
    pub scene: Arc<dyn SceneSurface>,
    pub temperature_chart: Arc<dyn ChartSurface>,
    pub pollutant_chart: Arc<dyn ChartSurface>,
}

pub struct Dashboard {
    forecasts: Arc<dyn ForecastSource>,
    positions: Arc<dyn PositionProvider>,
    scene: SceneRenderer,
    temperature_chart: Arc<dyn ChartSurface>,
    pollutant_chart: Arc<dyn ChartSurface>,
    geolocation_timeout: Duration,
    state: Mutex<DisplayState>,
}

fn pick_sample() -> &'static str {
    let index = rand::rng().random_range(0..SAMPLE_LOCATIONS.len());
    SAMPLE_LOCATIONS[index]
}

impl Dashboard {
    pub fn new(
        forecasts: Arc<dyn ForecastSource>,
        positions: Arc<dyn PositionProvider>,
        surfaces: Surfaces,
        geolocation_timeout: Duration,
    ) -> Self {
        Self {
            forecasts,
            positions,
            scene: SceneRenderer::new(surfaces.scene),
            temperature_chart: surfaces.temperature_chart,
            pollutant_chart: surfaces.pollutant_chart,
            geolocation_timeout,
            state: Mutex::new(DisplayState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, err: DashboardError) -> DashboardError {
        warn!(error = %err, "Dashboard action failed");
        self.lock().status = err.user_message();
        err
    }

    /// Submit the search field
    pub async fn search(&self, query: &str) -> Result<FetchOutcome, DashboardError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(self.report(DashboardError::validation("Enter a location")));
        }
        {
            let mut state = self.lock();
            state.input = query.to_string();
            state.status.clear();
        }
        self.fetch(query).await
    }

    /// Fetch `query` and, unless superseded, make it the current document
    pub async fn fetch(&self, query: &str) -> Result<FetchOutcome, DashboardError> {
        let ticket = {
            let mut state = self.lock();
            state.latest_ticket += 1;
            state.status = LOADING_STATUS.to_string();
            state.latest_ticket
        };
        info!(query, ticket, "Fetching forecast");

        let result = self.forecasts.fetch_forecast(query).await;

        let mut state = self.lock();
        if state.latest_ticket != ticket {
            debug!(query, ticket, latest = state.latest_ticket, "Discarding stale response");
            return Ok(FetchOutcome::Stale);
        }

        let document = match result {
            Ok(document) => Arc::new(document),
            Err(err) => {
                warn!(query, error = %err, "Forecast fetch failed");
                state.status = err.user_message();
                return Err(err);
            }
        };

        state.document = Some(Arc::clone(&document));
        state.fetched_at = Some(Local::now());
        state.last_query = Some(query.to_string());
        state.selected_day = None;
        // Keep any message set while the request was in flight.
        if state.status == LOADING_STATUS {
            state.status.clear();
        }

        self.scene.render(classify_current(&document.current));
        self.draw_charts(&mut state, &document)?;
        Ok(FetchOutcome::Applied)
    }

    /// Redraw both charts for the current scope; called with the state held.
    ///
    /// Both surfaces are released before either is drawn, so a failed draw
    /// leaves that chart empty rather than showing an older document.
    fn draw_charts(
        &self,
        state: &mut DisplayState,
        document: &ForecastDocument,
    ) -> Result<(), DashboardError> {
        let series = build_hourly_series(document, state.selected_day, state.unit);
        let charts = [
            (&self.temperature_chart, series.temperature_chart()),
            (&self.pollutant_chart, series.pollutant_chart()),
        ];
        for (surface, _) in &charts {
            surface.destroy();
        }

        let mut first_error = None;
        for (surface, spec) in &charts {
            if let Err(err) = surface.draw(spec) {
                warn!(chart = ?spec.kind, error = %err, "Chart failed to draw");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => {
                state.status = err.user_message();
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Use the device position, waiting at most the configured timeout
    pub async fn locate(&self) -> Result<FetchOutcome, DashboardError> {
        self.lock().status = "Locating…".to_string();
        let position = locate_with_timeout(self.positions.as_ref(), self.geolocation_timeout)
            .await
            .map_err(|e| self.report(e))?;
        self.fetch_position(position).await
    }

    /// Same as [`Dashboard::locate`] with a position reported by the caller
    pub async fn locate_at(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<FetchOutcome, DashboardError> {
        let position = Position::new(latitude, longitude).map_err(|e| self.report(e))?;
        self.fetch_position(position).await
    }

    async fn fetch_position(&self, position: Position) -> Result<FetchOutcome, DashboardError> {
        let query = position.to_query();
        self.lock().input = query.clone();
        self.fetch(&query).await
    }

    /// Fetch one of the sample locations, chosen uniformly
    pub async fn random_location(&self) -> Result<FetchOutcome, DashboardError> {
        let pick = pick_sample();
        self.lock().input = pick.to_string();
        self.fetch(pick).await
    }

    pub fn clear_input(&self) {
        let mut state = self.lock();
        state.input.clear();
        state.status.clear();
    }

    /// Flip Celsius/Fahrenheit and redraw from the cached document
    pub fn toggle_unit(&self) -> Result<Unit, DashboardError> {
        let mut state = self.lock();
        state.unit = state.unit.toggled();
        let unit = state.unit;
        info!(unit = unit.symbol(), "Unit toggled");
        if let Some(document) = state.document.clone() {
            self.draw_charts(&mut state, &document)?;
        }
        Ok(unit)
    }

    /// Scope the hourly charts to one forecast day
    pub fn select_day(&self, index: usize) -> Result<(), DashboardError> {
        let mut state = self.lock();
        let Some(document) = state.document.clone() else {
            drop(state);
            return Err(self.report(DashboardError::validation("No forecast loaded")));
        };
        if index >= document.forecast_days.len() {
            drop(state);
            return Err(self.report(DashboardError::validation(format!(
                "No forecast for day {index}"
            ))));
        }
        state.selected_day = Some(index);
        self.draw_charts(&mut state, &document)
    }

    pub fn view(&self) -> DashboardView {
        let state = self.lock();
        let document = state.document.as_deref();
        DashboardView {
            status: state.status.clone(),
            input: state.input.clone(),
            unit: state.unit,
            fields: document.map(|d| project(d, state.unit, state.fetched_at)),
            cards: document
                .map(|d| build_day_cards(&d.forecast_days, state.unit))
                .unwrap_or_default(),
            highlighted_day: state.highlighted_day(),
            series: document.map(|d| build_hourly_series(d, state.selected_day, state.unit)),
            scene: self.scene.category(),
        }
    }

    pub fn unit(&self) -> Unit {
        self.lock().unit
    }

    pub fn status(&self) -> String {
        self.lock().status.clone()
    }

    pub fn document(&self) -> Option<Arc<ForecastDocument>> {
        self.lock().document.clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.lock().last_query.clone()
    }

    pub fn scene(&self) -> &SceneRenderer {
        &self.scene
    }

    /// Stop every scene timer and release the charts
    pub fn shutdown(&self) {
        self.scene.reset();
        self.temperature_chart.destroy();
        self.pollutant_chart.destroy();
        info!("Dashboard shut down");
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("state", &*self.lock())
            .field("scene", &self.scene)
            .finish()
    }
}
