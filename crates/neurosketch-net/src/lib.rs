//! Neural network genotypes for evolving agents.
//!
//! A genotype is a square feed-forward network: `L` layers of `N` sigmoid
//! neurons, each neuron holding `N` input weights and a bias. Evaluating it
//! against sensor inputs is the phenotype.

pub mod network;
pub mod mutation;
pub mod validation;

pub use network::{
    activate_layer, activate_network, activate_neuron, sigmoid, Activations, Layer, Network,
    Neuron,
};
pub use mutation::{Mutator, PointMutation};
pub use validation::{validate_network, validate_shape};
