//! Shape validation for network genotypes.

use crate::network::Network;
use neurosketch_core::{Error, Result};

/// Check that a network is `L x N x (N + 1)` with finite weights
pub fn validate_network(network: &Network) -> Result<()> {
    if network.depth() == 0 {
        return Err(Error::Validation("Network has no layers".to_string()));
    }

    let width = network.width();
    if width == 0 {
        return Err(Error::Validation("Network has zero-width layers".to_string()));
    }

    for (layer_idx, layer) in network.layers().iter().enumerate() {
        if layer.len() != width {
            return Err(Error::Validation(format!(
                "Layer {} has {} neurons, expected {}",
                layer_idx,
                layer.len(),
                width
            )));
        }

        for (neuron_idx, neuron) in layer.neurons.iter().enumerate() {
            if neuron.weights.len() != width + 1 {
                return Err(Error::Validation(format!(
                    "Layer {} neuron {} has {} weights, expected {}",
                    layer_idx,
                    neuron_idx,
                    neuron.weights.len(),
                    width + 1
                )));
            }
            if neuron.weights.iter().any(|w| !w.is_finite()) {
                return Err(Error::Validation(format!(
                    "Layer {} neuron {} has a non-finite weight",
                    layer_idx, neuron_idx
                )));
            }
        }
    }

    Ok(())
}

/// Check that a network has exactly the expected depth and width
pub fn validate_shape(network: &Network, depth: usize, width: usize) -> Result<()> {
    validate_network(network)?;
    if network.depth() != depth {
        return Err(Error::mismatch("network depth", depth, network.depth()));
    }
    if network.width() != width {
        return Err(Error::mismatch("network width", width, network.width()));
    }
    Ok(())
}
