//! Point mutation of network weights.

use crate::network::Network;
use neurosketch_core::{MutationConfig, RandomSource};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A single applied perturbation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointMutation {
    pub layer: usize,
    pub neuron: usize,
    pub weight: usize,
    pub delta: f64,
}

pub struct Mutator {
    config: MutationConfig,
}

impl Mutator {
    pub fn new(config: MutationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    /// Add a uniform draw from `(delta_min, delta_max)` to one weight picked
    /// uniformly by layer, then neuron, then weight index.
    ///
    /// Returns `None` only for a network with an empty layer or neuron.
    pub fn point_mutate<R: RandomSource + ?Sized>(
        &self,
        network: &mut Network,
        rng: &mut R,
    ) -> Option<PointMutation> {
        if network.depth() == 0 || network.width() == 0 {
            return None;
        }
        let layer = rng.index(network.depth());
        let neuron = rng.index(network.width());
        let weight = rng.index(network.width() + 1);
        let delta = rng.uniform(self.config.delta_min, self.config.delta_max);

        let slot = network.weight_mut(layer, neuron, weight)?;
        *slot += delta;

        Some(PointMutation {
            layer,
            neuron,
            weight,
            delta,
        })
    }

    /// Apply `count` independent point mutations
    pub fn mutate<R: RandomSource + ?Sized>(
        &self,
        network: &mut Network,
        count: usize,
        rng: &mut R,
    ) -> Vec<PointMutation> {
        let applied: Vec<PointMutation> = (0..count)
            .filter_map(|_| self.point_mutate(network, rng))
            .collect();
        trace!(requested = count, applied = applied.len(), "Mutated network");
        applied
    }
}

impl Default for Mutator {
    fn default() -> Self {
        Self::new(MutationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_shape;
    use neurosketch_core::NetworkConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn network(rng: &mut ChaCha8Rng) -> Network {
        Network::random(&NetworkConfig::default(), rng)
    }

    #[test]
    fn test_point_mutation_changes_one_weight() {
        let mutator = Mutator::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let original = network(&mut rng);
        let mut mutated = original.clone();

        let m = mutator.point_mutate(&mut mutated, &mut rng).unwrap();
        assert!(m.delta >= -2.0 && m.delta < 3.0);

        let before = original.weight(m.layer, m.neuron, m.weight).unwrap();
        let after = mutated.weight(m.layer, m.neuron, m.weight).unwrap();
        assert!((after - before - m.delta).abs() < 1e-12);

        let changed = original
            .layers()
            .iter()
            .zip(mutated.layers())
            .flat_map(|(a, b)| a.neurons.iter().zip(&b.neurons))
            .flat_map(|(a, b)| a.weights.iter().zip(&b.weights))
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed <= 1);
    }

    #[test]
    fn test_mutate_count_and_shape() {
        let mutator = Mutator::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut net = network(&mut rng);

        assert!(mutator.mutate(&mut net, 0, &mut rng).is_empty());
        assert_eq!(mutator.mutate(&mut net, 25, &mut rng).len(), 25);
        assert!(validate_shape(&net, 3, 4).is_ok());
    }

    #[test]
    fn test_mutation_reaches_bias() {
        let mutator = Mutator::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut net = network(&mut rng);
        let hits_bias = mutator
            .mutate(&mut net, 500, &mut rng)
            .iter()
            .any(|m| m.weight == 4);
        assert!(hits_bias);
    }

    #[test]
    fn test_mutation_is_deterministic_under_seed() {
        let mutator = Mutator::default();
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        let mut net_a = network(&mut a);
        let mut net_b = network(&mut b);
        mutator.mutate(&mut net_a, 10, &mut a);
        mutator.mutate(&mut net_b, 10, &mut b);
        assert_eq!(net_a, net_b);
    }
}
