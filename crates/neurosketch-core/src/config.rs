//! Configuration types for the simulation.
//!
//! Every value here is fixed once a simulation is constructed.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Cellular automaton parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomatonConfig {
    /// Width of the toroidal grid
    pub width: i32,
    /// Height of the toroidal grid
    pub height: i32,
    /// Column period of the striped initial pattern
    pub stripe_period: i32,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            stripe_period: 7,
        }
    }
}

impl AutomatonConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.stripe_period <= 0 {
            return Err(Error::InvalidConfig(format!(
                "stripe period must be positive, got {}",
                self.stripe_period
            )));
        }
        Ok(())
    }
}

/// Shape of every agent's network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of weight layers (L)
    pub layers: usize,
    /// Neurons per layer, also the input and output width (N)
    pub neurons: usize,
    /// Initial weights are drawn from (-max_weight, max_weight)
    pub max_weight: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            layers: 3,
            neurons: 4,
            max_weight: 10.0,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.layers == 0 {
            return Err(Error::InvalidConfig("network needs at least one layer".into()));
        }
        // speed + two turn channels
        if self.neurons < 3 {
            return Err(Error::InvalidConfig(format!(
                "network needs at least 3 neurons per layer, got {}",
                self.neurons
            )));
        }
        if !(self.max_weight > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "max_weight must be positive, got {}",
                self.max_weight
            )));
        }
        Ok(())
    }
}

/// Point mutation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Lower bound of the additive perturbation
    pub delta_min: f64,
    /// Upper bound of the additive perturbation
    pub delta_max: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            delta_min: -2.0,
            delta_max: 3.0,
        }
    }
}

impl MutationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.delta_min < self.delta_max) {
            return Err(Error::InvalidConfig(format!(
                "mutation interval ({}, {}) is empty",
                self.delta_min, self.delta_max
            )));
        }
        Ok(())
    }
}

/// How parents are drawn from the previous episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    /// Any agent of the previous population, with equal probability
    #[default]
    Uniform,
    /// Child `i` draws from the top `max(i, 1)` agents by points
    RankBiased,
}

/// Evolving population parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Agents per episode
    pub pop_size: usize,
    /// Head radius and head-to-tail distance
    pub agent_size: f64,
    /// World units per second at full forward output
    pub max_speed: f64,
    /// An episode ends once this many frames have run
    pub max_frames: u64,
    /// Sentinel distance meaning "no neighbor seen"
    pub no_neighbor_distance: f64,
    /// Width of the random drift applied to an inherited hue
    pub hue_drift: f64,
    pub selection: SelectionKind,
    pub network: NetworkConfig,
    pub mutation: MutationConfig,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            pop_size: 30,
            agent_size: 1.0 / 50.0,
            max_speed: 0.3,
            max_frames: 500,
            no_neighbor_distance: 2.0,
            hue_drift: 0.1,
            selection: SelectionKind::Uniform,
            network: NetworkConfig::default(),
            mutation: MutationConfig::default(),
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pop_size == 0 {
            return Err(Error::InvalidConfig("pop_size must be positive".into()));
        }
        if !(self.agent_size > 0.0) || !(self.max_speed > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "agent_size and max_speed must be positive, got {} and {}",
                self.agent_size, self.max_speed
            )));
        }
        if self.max_frames == 0 {
            return Err(Error::InvalidConfig("max_frames must be positive".into()));
        }
        self.network.validate()?;
        self.mutation.validate()
    }
}

/// Top-level configuration for a headless run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Fixed frame time in seconds
    pub dt: f64,
    /// Automaton steps to run
    pub life_steps: u64,
    /// Episodes to run
    pub generations: u64,
    pub automaton: AutomatonConfig,
    pub population: PopulationConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            dt: 1.0 / 60.0,
            life_steps: 200,
            generations: 20,
            automaton: AutomatonConfig::default(),
            population: PopulationConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.dt > 0.0) {
            return Err(Error::InvalidConfig(format!("dt must be positive, got {}", self.dt)));
        }
        self.automaton.validate()?;
        self.population.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let automaton = AutomatonConfig::default();
        assert_eq!(automaton.width, 400);
        assert_eq!(automaton.height, 400);

        let population = PopulationConfig::default();
        assert_eq!(population.pop_size, 30);
        assert_eq!(population.max_frames, 500);
        assert_eq!(population.network.layers, 3);
        assert_eq!(population.network.neurons, 4);
        assert_eq!(population.selection, SelectionKind::Uniform);

        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let grid = AutomatonConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(grid.validate(), Err(Error::InvalidConfig(_))));

        let net = NetworkConfig {
            neurons: 2,
            ..Default::default()
        };
        assert!(net.validate().is_err());

        let mutation = MutationConfig {
            delta_min: 1.0,
            delta_max: 1.0,
        };
        assert!(mutation.validate().is_err());

        let population = PopulationConfig {
            pop_size: 0,
            ..Default::default()
        };
        assert!(population.validate().is_err());

        let population = PopulationConfig {
            max_speed: f64::NAN,
            ..Default::default()
        };
        assert!(population.validate().is_err());
    }

    #[test]
    fn test_selection_kind_serialization() {
        let json = serde_json::to_string(&SelectionKind::RankBiased).unwrap();
        assert_eq!(json, "\"rank_biased\"");

        let config = PopulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PopulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
