//! Headless driver for the life and neuro sketches.

mod telemetry;

use anyhow::{Context, Result};
use neurosketch_core::RunConfig;
use neurosketch_world::{LifeSketch, NeuroSketch, Sketch};
use std::path::Path;
use tracing::{debug, info, info_span};

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = load_config()?;
    config.validate().context("invalid run configuration")?;
    info!(
        seed = config.seed,
        life_steps = config.life_steps,
        generations = config.generations,
        "Starting neurosketch runner"
    );

    run_life(&config)?;
    run_neuro(&config)?;

    info!("Run complete");
    Ok(())
}

/// Defaults, optionally replaced by a JSON file named on the command line,
/// with `NEUROSKETCH_SEED` taking precedence for the seed.
fn load_config() -> Result<RunConfig> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => read_config(Path::new(&path))?,
        None => RunConfig::default(),
    };

    if let Ok(seed) = std::env::var("NEUROSKETCH_SEED") {
        config.seed = seed
            .parse()
            .with_context(|| format!("NEUROSKETCH_SEED is not a number: {seed}"))?;
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<RunConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn run_life(config: &RunConfig) -> Result<()> {
    let _span = info_span!("life").entered();
    let mut life = LifeSketch::new(&config.automaton)?;
    drive(&mut life, config.life_steps, config.dt)?;
    info!(
        sketch = life.name(),
        generation = life.generation(),
        live_cells = life.live_cells(),
        "Automaton finished"
    );
    Ok(())
}

fn run_neuro(config: &RunConfig) -> Result<()> {
    let _span = info_span!("neuro").entered();
    let mut sketch = NeuroSketch::new(config.population.clone(), config.seed)?;

    while (sketch.completed_episodes() as u64) < config.generations {
        sketch.update(config.dt)?;
    }

    for summary in sketch.history() {
        println!("{}", serde_json::to_string(summary)?);
    }

    let best = sketch.history().iter().map(|s| s.best_points).max().unwrap_or(0);
    info!(
        sketch = sketch.name(),
        episodes = sketch.completed_episodes(),
        best_points = best,
        "Evolution finished"
    );
    Ok(())
}

fn drive(sketch: &mut dyn Sketch, frames: u64, dt: f64) -> Result<()> {
    sketch.reset();
    for frame in 0..frames {
        sketch.update(dt)?;
        if frame % 50 == 0 {
            debug!(sketch = sketch.name(), frame, "Progress");
        }
    }
    Ok(())
}
