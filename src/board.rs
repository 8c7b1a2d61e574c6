//! In-memory drawing surfaces used by the MCP server

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::charts::{ChartSpec, ChartSurface};
use crate::classifier::SceneCategory;
use crate::error::DashboardError;
use crate::scene::{ElementId, Icon, Particle, ParticleKind, SceneSurface};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn icon_art(icon: Icon) -> &'static str {
    match icon {
        Icon::Sun => "☀",
        Icon::Moon => "☾",
        Icon::Cloud => "☁",
        Icon::RainCloud => "☂",
        Icon::SnowCloud => "❄",
        Icon::FogCloud => "≋",
    }
}

pub fn particle_name(kind: ParticleKind) -> &'static str {
    match kind {
        ParticleKind::Raindrop => "raindrop",
        ParticleKind::Splash => "splash",
        ParticleKind::Snowflake => "snowflake",
        ParticleKind::SunRays => "sun-rays",
        ParticleKind::Flash => "flash",
        ParticleKind::Bolt => "bolt",
        ParticleKind::Star => "star",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSnapshot {
    pub backdrop: Option<SceneCategory>,
    pub art: Option<String>,
    /// Live element count per particle kind, sorted by name
    pub elements: Vec<(&'static str, usize)>,
}

#[derive(Debug, Default)]
struct SceneBoardState {
    backdrop: Option<SceneCategory>,
    art: Option<String>,
    elements: HashMap<ElementId, Particle>,
}

/// Scene surface that keeps its elements in memory
#[derive(Debug, Default)]
pub struct SceneBoard {
    state: Mutex<SceneBoardState>,
    missing_icons: HashSet<Icon>,
}

impl SceneBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board whose assets for `icons` fail to load
    pub fn with_missing_icons<I: IntoIterator<Item = Icon>>(icons: I) -> Self {
        Self {
            missing_icons: icons.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let state = lock(&self.state);
        let mut counts: HashMap<&'static str, usize> = HashMap::new();
        for particle in state.elements.values() {
            *counts.entry(particle_name(particle.kind)).or_default() += 1;
        }
        let mut elements: Vec<_> = counts.into_iter().collect();
        elements.sort_unstable();

        SceneSnapshot {
            backdrop: state.backdrop,
            art: state.art.clone(),
            elements,
        }
    }
}

impl SceneSurface for SceneBoard {
    fn set_backdrop(&self, category: Option<SceneCategory>) {
        lock(&self.state).backdrop = category;
    }

    fn show_icon(&self, icon: Icon) -> Result<(), DashboardError> {
        if self.missing_icons.contains(&icon) {
            return Err(DashboardError::render(format!("no asset for {icon:?}")));
        }
        lock(&self.state).art = Some(icon_art(icon).to_string());
        Ok(())
    }

    fn show_glyph(&self, glyph: &str) {
        lock(&self.state).art = Some(glyph.to_string());
    }

    fn clear_art(&self) {
        lock(&self.state).art = None;
    }

    fn add(&self, id: ElementId, particle: &Particle) {
        lock(&self.state).elements.insert(id, particle.clone());
    }

    fn remove(&self, id: ElementId) {
        lock(&self.state).elements.remove(&id);
    }
}

/// Chart surface that keeps the last drawn chart
#[derive(Debug, Default)]
pub struct ChartBoard {
    chart: Mutex<Option<ChartSpec>>,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ChartSpec> {
        lock(&self.chart).clone()
    }
}

impl ChartSurface for ChartBoard {
    fn draw(&self, chart: &ChartSpec) -> Result<(), DashboardError> {
        if let Some(bad) = chart
            .datasets
            .iter()
            .find(|d| d.values.len() != chart.labels.len())
        {
            return Err(DashboardError::render(format!(
                "dataset {} has {} points for {} labels",
                bad.label,
                bad.values.len(),
                chart.labels.len()
            )));
        }
        *lock(&self.chart) = Some(chart.clone());
        Ok(())
    }

    fn clear(&self) {
        if let Some(chart) = lock(&self.chart).as_mut() {
            chart.datasets.clear();
        }
    }

    fn destroy(&self) {
        *lock(&self.chart) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartKind, Dataset};

    fn spec(points: usize) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Temperature,
            title: "Next 24 hours".to_string(),
            y_axis: "°C".to_string(),
            labels: vec!["10:00".to_string(), "11:00".to_string()],
            datasets: vec![Dataset {
                label: "Temp".to_string(),
                color: "#fff",
                values: vec![Some(1.0); points],
            }],
        }
    }

    #[test]
    fn test_chart_board_lifecycle() {
        let board = ChartBoard::new();
        board.draw(&spec(2)).expect("draw should succeed");
        assert_eq!(board.current().map(|c| c.labels.len()), Some(2));

        board.clear();
        assert_eq!(board.current().map(|c| c.datasets.len()), Some(0));

        board.destroy();
        assert!(board.current().is_none());
    }

    #[test]
    fn test_chart_board_rejects_ragged_datasets() {
        let board = ChartBoard::new();
        let err = board.draw(&spec(3)).unwrap_err();
        assert!(matches!(err, DashboardError::Render { .. }));
        assert!(board.current().is_none());
    }

    #[test]
    fn test_scene_board_missing_icon() {
        let board = SceneBoard::with_missing_icons([Icon::Moon]);
        assert!(board.show_icon(Icon::Moon).is_err());
        board.show_icon(Icon::Sun).expect("sun is available");
        assert_eq!(board.snapshot().art.as_deref(), Some("☀"));
    }
}
