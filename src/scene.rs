//! Animated scene driven by the current conditions
//!
//! Each scene is a static icon plus zero or more repeating effects. An effect
//! is a tokio task that spawns short-lived particles on a surface and retires
//! them when their lifetime ends. Every element placed on the surface goes
//! through a [`Stage`], which tags it with the render generation that created
//! it; once the renderer moves to a new generation, stale effects can neither
//! place nor keep elements.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::classifier::SceneCategory;
use crate::constants::FALLBACK_GLYPH;
use crate::error::DashboardError;

pub type ElementId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Raindrop,
    Splash,
    Snowflake,
    SunRays,
    Flash,
    Bolt,
    Star,
}

/// A transient visual element. Positions are percentages of the scene box.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub left: f64,
    pub top: f64,
    pub size: f64,
    pub opacity: f64,
    /// `None` for elements that live until the next reset
    pub lifetime: Option<Duration>,
}

impl Particle {
    fn new(kind: ParticleKind, left: f64, top: f64, lifetime: Option<Duration>) -> Self {
        Self {
            kind,
            left,
            top,
            size: 0.0,
            opacity: 1.0,
            lifetime,
        }
    }

    fn raindrop(rng: &mut StdRng) -> Self {
        let lifetime = Duration::from_secs_f64(rng.random_range(0.8..2.0));
        Self {
            opacity: rng.random_range(0.4..1.0),
            ..Self::new(ParticleKind::Raindrop, rng.random_range(0.0..100.0), 0.0, Some(lifetime))
        }
    }

    fn splash(left: f64) -> Self {
        Self::new(ParticleKind::Splash, left, 100.0, Some(Duration::from_millis(900)))
    }

    fn snowflake(rng: &mut StdRng) -> Self {
        let lifetime = Duration::from_secs_f64(rng.random_range(6.0..14.0) + 0.3);
        Self {
            size: rng.random_range(6.0..16.0),
            ..Self::new(ParticleKind::Snowflake, rng.random_range(0.0..100.0), 0.0, Some(lifetime))
        }
    }

    fn flash() -> Self {
        Self {
            opacity: 0.6,
            ..Self::new(ParticleKind::Flash, 0.0, 0.0, Some(Duration::from_millis(700)))
        }
    }

    fn bolt(rng: &mut StdRng) -> Self {
        Self {
            opacity: 0.95,
            ..Self::new(
                ParticleKind::Bolt,
                rng.random_range(30.0..70.0),
                rng.random_range(20.0..50.0),
                Some(Duration::from_millis(900)),
            )
        }
    }

    fn star(rng: &mut StdRng) -> Self {
        let lifetime = Duration::from_secs_f64(rng.random_range(6.0..13.0));
        Self {
            size: rng.random_range(2.0..6.0),
            opacity: 0.9,
            ..Self::new(
                ParticleKind::Star,
                rng.random_range(5.0..95.0),
                rng.random_range(5.0..75.0),
                Some(lifetime),
            )
        }
    }

    fn sun_rays() -> Self {
        Self {
            size: 260.0,
            opacity: 0.9,
            ..Self::new(ParticleKind::SunRays, 50.0, 40.0, None)
        }
    }
}

/// Static illustration shown for a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Sun,
    Moon,
    Cloud,
    RainCloud,
    SnowCloud,
    FogCloud,
}

impl Icon {
    /// Windy scenes have no illustration
    pub fn for_category(category: SceneCategory) -> Option<Self> {
        match category {
            SceneCategory::Sunny => Some(Self::Sun),
            SceneCategory::Night => Some(Self::Moon),
            SceneCategory::Cloudy => Some(Self::Cloud),
            SceneCategory::Rain | SceneCategory::Thunder => Some(Self::RainCloud),
            SceneCategory::Snow => Some(Self::SnowCloud),
            SceneCategory::Fog => Some(Self::FogCloud),
            SceneCategory::Wind => None,
        }
    }
}

/// Where the scene is drawn
pub trait SceneSurface: Send + Sync {
    /// Switch the backdrop styling; `None` restores the neutral scene
    fn set_backdrop(&self, category: Option<SceneCategory>);

    fn show_icon(&self, icon: Icon) -> Result<(), DashboardError>;

    fn show_glyph(&self, glyph: &str);

    fn clear_art(&self);

    fn add(&self, id: ElementId, particle: &Particle);

    fn remove(&self, id: ElementId);
}

#[derive(Debug, Default)]
struct StageState {
    generation: u64,
    next_id: ElementId,
    live: HashSet<ElementId>,
}

/// Tracks every element placed on the surface, per render generation
struct Stage {
    surface: Arc<dyn SceneSurface>,
    state: Mutex<StageState>,
}

impl Stage {
    fn new(surface: Arc<dyn SceneSurface>) -> Self {
        Self {
            surface,
            state: Mutex::new(StageState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Place a particle unless `generation` has been superseded
    fn place(&self, generation: u64, particle: &Particle) -> Option<ElementId> {
        let mut state = self.lock();
        if state.generation != generation {
            return None;
        }
        state.next_id += 1;
        let id = state.next_id;
        state.live.insert(id);
        self.surface.add(id, particle);
        Some(id)
    }

    fn retire(&self, generation: u64, id: ElementId) {
        let mut state = self.lock();
        if state.generation == generation && state.live.remove(&id) {
            self.surface.remove(id);
        }
    }

    /// Start a new generation, removing everything the old one left behind
    fn advance(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        for id in state.live.drain() {
            self.surface.remove(id);
        }
        state.generation
    }

    fn live_count(&self) -> usize {
        self.lock().live.len()
    }
}

/// Repeating particle effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Rain,
    Snow,
    Lightning,
    Stars,
}

impl EffectKind {
    /// Effects started for a category; fog, wind and cloudy scenes are static
    pub fn for_category(category: SceneCategory) -> &'static [Self] {
        match category {
            SceneCategory::Thunder => &[Self::Rain, Self::Lightning],
            SceneCategory::Rain => &[Self::Rain],
            SceneCategory::Snow => &[Self::Snow],
            SceneCategory::Night => &[Self::Stars],
            SceneCategory::Sunny
            | SceneCategory::Cloudy
            | SceneCategory::Fog
            | SceneCategory::Wind => &[],
        }
    }

    fn period(self, rng: &mut StdRng) -> Duration {
        match self {
            Self::Rain => Duration::from_millis(1600),
            Self::Snow => Duration::from_millis(2200),
            Self::Lightning => Duration::from_millis(rng.random_range(2300..4300)),
            Self::Stars => Duration::from_secs(8),
        }
    }

    fn burst(self, rng: &mut StdRng) -> Vec<Particle> {
        match self {
            Self::Rain => (0..32).map(|_| Particle::raindrop(rng)).collect(),
            Self::Snow => (0..26).map(|_| Particle::snowflake(rng)).collect(),
            Self::Lightning => Vec::new(),
            Self::Stars => (0..18).map(|_| Particle::star(rng)).collect(),
        }
    }

    fn refill(self, rng: &mut StdRng) -> Vec<Particle> {
        match self {
            Self::Rain => (0..6).map(|_| Particle::raindrop(rng)).collect(),
            Self::Snow => (0..4).map(|_| Particle::snowflake(rng)).collect(),
            Self::Lightning => vec![Particle::flash(), Particle::bolt(rng)],
            Self::Stars => self.burst(rng),
        }
    }

    /// Follow-up particle left behind when one expires
    fn aftermath(self, expired: &Particle) -> Option<Particle> {
        (expired.kind == ParticleKind::Raindrop).then(|| Particle::splash(expired.left))
    }
}

struct Pending {
    due: Instant,
    id: ElementId,
    particle: Particle,
}

/// Particles owned by one running effect
struct EffectRun {
    kind: EffectKind,
    stage: Arc<Stage>,
    generation: u64,
    rng: StdRng,
    pending: Vec<Pending>,
}

impl EffectRun {
    /// Returns false once the generation is stale
    fn place(&mut self, particle: Particle) -> bool {
        let Some(id) = self.stage.place(self.generation, &particle) else {
            return false;
        };
        if let Some(lifetime) = particle.lifetime {
            self.pending.push(Pending {
                due: Instant::now() + lifetime,
                id,
                particle,
            });
        }
        true
    }

    fn place_all(&mut self, particles: Vec<Particle>) -> bool {
        particles.into_iter().all(|p| self.place(p))
    }

    fn expire_due(&mut self) -> bool {
        let now = Instant::now();
        let (due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|p| p.due <= now);
        self.pending = rest;

        for expired in due {
            self.stage.retire(self.generation, expired.id);
            if let Some(next) = self.kind.aftermath(&expired.particle) {
                if !self.place(next) {
                    return false;
                }
            }
        }
        true
    }

    async fn run(mut self) {
        let period = self.kind.period(&mut self.rng);
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let next_due = self.pending.iter().map(|p| p.due).min();
            let alive = tokio::select! {
                _ = ticker.tick() => {
                    let particles = self.kind.refill(&mut self.rng);
                    self.place_all(particles)
                }
                () = time::sleep_until(next_due.unwrap_or_else(Instant::now)), if next_due.is_some() => {
                    self.expire_due()
                }
            };
            if !alive {
                debug!(effect = ?self.kind, "Effect outlived its scene");
                return;
            }
        }
    }
}

/// A running effect; dropping or cancelling it stops its timer
pub struct EffectHandle {
    kind: EffectKind,
    task: JoinHandle<()>,
}

impl EffectHandle {
    /// Spawn the initial burst and start the repeating loop
    fn start(kind: EffectKind, stage: Arc<Stage>, generation: u64) -> Self {
        let mut run = EffectRun {
            kind,
            stage,
            generation,
            rng: StdRng::from_rng(&mut rand::rng()),
            pending: Vec::new(),
        };
        let burst = kind.burst(&mut run.rng);
        run.place_all(burst);

        Self {
            kind,
            task: tokio::spawn(run.run()),
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for EffectHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("kind", &self.kind)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

#[derive(Default)]
struct RendererState {
    category: Option<SceneCategory>,
    effects: Vec<EffectHandle>,
}

/// Owns the scene surface and every effect running on it
pub struct SceneRenderer {
    surface: Arc<dyn SceneSurface>,
    stage: Arc<Stage>,
    state: Mutex<RendererState>,
}

impl SceneRenderer {
    pub fn new(surface: Arc<dyn SceneSurface>) -> Self {
        Self {
            stage: Arc::new(Stage::new(Arc::clone(&surface))),
            surface,
            state: Mutex::new(RendererState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RendererState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace whatever is on screen with `category`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn render(&self, category: SceneCategory) {
        let mut state = self.lock();
        let generation = self.clear(&mut state);

        self.surface.set_backdrop(Some(category));
        self.show_art(category);
        if category == SceneCategory::Sunny {
            self.stage.place(generation, &Particle::sun_rays());
        }

        state.effects = EffectKind::for_category(category)
            .iter()
            .map(|&kind| EffectHandle::start(kind, Arc::clone(&self.stage), generation))
            .collect();
        state.category = Some(category);
        debug!(
            scene = category.name(),
            effects = state.effects.len(),
            "Scene rendered"
        );
    }

    /// Cancel every effect and remove every element
    pub fn reset(&self) {
        let mut state = self.lock();
        self.clear(&mut state);
    }

    fn clear(&self, state: &mut RendererState) -> u64 {
        for effect in state.effects.drain(..) {
            effect.cancel();
        }
        state.category = None;
        let generation = self.stage.advance();
        self.surface.clear_art();
        self.surface.set_backdrop(None);
        generation
    }

    /// Icon with one retry, then the fallback glyph
    fn show_art(&self, category: SceneCategory) {
        let Some(icon) = Icon::for_category(category) else {
            self.surface.show_glyph(FALLBACK_GLYPH);
            return;
        };
        if let Err(first) = self.surface.show_icon(icon) {
            warn!(?icon, error = %first, "Icon failed to load, retrying");
            if let Err(second) = self.surface.show_icon(icon) {
                warn!(?icon, error = %second, "Icon unavailable, using fallback glyph");
                self.surface.show_glyph(FALLBACK_GLYPH);
            }
        }
    }

    pub fn category(&self) -> Option<SceneCategory> {
        self.lock().category
    }

    /// Number of repeating effects currently owned
    pub fn active_effects(&self) -> usize {
        self.lock().effects.len()
    }

    pub fn effect_kinds(&self) -> Vec<EffectKind> {
        self.lock().effects.iter().map(EffectHandle::kind).collect()
    }

    /// Number of elements currently on the surface
    pub fn live_elements(&self) -> usize {
        self.stage.live_count()
    }
}

impl std::fmt::Debug for SceneRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneRenderer")
            .field("category", &self.category())
            .field("live_elements", &self.live_elements())
            .finish()
    }
}
