//! Host-facing wrappers that drive a simulation one frame at a time.

use crate::automaton::{column_stripes, Automaton, GameOfLife};
use crate::grid::{Grid, Pattern};
use crate::population::{Population, TickReport};
use neurosketch_core::{
    AutomatonConfig, EpisodeSummary, PopulationConfig, Position, RandomSource, Result,
};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

/// Something a host loop can restart and advance frame by frame
pub trait Sketch {
    /// Return to the initial state
    fn reset(&mut self);

    /// Advance by one frame of `dt` seconds
    fn update(&mut self, dt: f64) -> Result<()>;

    fn name(&self) -> &str;
}

/// Game of Life seeded with vertical stripes
pub struct LifeSketch {
    automaton: Automaton<u8, GameOfLife>,
    initial: Grid<u8>,
}

impl LifeSketch {
    pub fn new(config: &AutomatonConfig) -> Result<Self> {
        config.validate()?;
        let initial = Grid::from_fn(
            config.width,
            config.height,
            column_stripes(config.stripe_period),
        )?;
        debug!(
            event = "life_init",
            width = config.width,
            height = config.height,
            live = initial.count(|&c| c == 1),
            "Life grid created"
        );
        Ok(Self {
            automaton: Automaton::new(initial.clone(), GameOfLife),
            initial,
        })
    }

    /// Drop a glider with its center at `at`
    pub fn press(&mut self, at: Position) {
        self.automaton.current_mut().stamp(&Pattern::glider(), at);
        trace!(x = at.x, y = at.y, "Glider stamped");
    }

    pub fn grid(&self) -> &Grid<u8> {
        self.automaton.current()
    }

    pub fn generation(&self) -> u64 {
        self.automaton.generation()
    }

    pub fn live_cells(&self) -> usize {
        self.automaton.current().count(|&c| c == 1)
    }
}

impl Sketch for LifeSketch {
    fn reset(&mut self) {
        self.automaton.reset(self.initial.clone());
    }

    fn update(&mut self, _dt: f64) -> Result<()> {
        self.automaton.step();
        Ok(())
    }

    fn name(&self) -> &str {
        "life"
    }
}

/// Evolving population with a record of every finished episode
pub struct NeuroSketch<R = ChaCha8Rng> {
    population: Population<R>,
    history: Vec<EpisodeSummary>,
    last: Option<TickReport>,
}

impl NeuroSketch<ChaCha8Rng> {
    pub fn new(config: PopulationConfig, seed: u64) -> Result<Self> {
        Ok(Self::from_population(Population::new(config, seed)?))
    }
}

impl<R: RandomSource> NeuroSketch<R> {
    pub fn from_population(population: Population<R>) -> Self {
        Self {
            population,
            history: Vec::new(),
            last: None,
        }
    }

    pub fn population(&self) -> &Population<R> {
        &self.population
    }

    /// Summaries of finished episodes, oldest first
    pub fn history(&self) -> &[EpisodeSummary] {
        &self.history
    }

    pub fn completed_episodes(&self) -> usize {
        self.history.len()
    }

    /// Report of the most recent frame
    pub fn last_tick(&self) -> Option<&TickReport> {
        self.last.as_ref()
    }
}

impl<R: RandomSource> Sketch for NeuroSketch<R> {
    fn reset(&mut self) {
        self.population.reset();
        self.last = None;
    }

    fn update(&mut self, dt: f64) -> Result<()> {
        let report = self.population.tick(dt)?;
        if let Some(summary) = &report.episode {
            self.history.push(summary.clone());
        }
        self.last = Some(report);
        Ok(())
    }

    fn name(&self) -> &str {
        "neuro"
    }
}
