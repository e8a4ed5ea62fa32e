//! Feed-forward network genotype and its forward pass.

use crate::validation::validate_network;
use neurosketch_core::{Error, NetworkConfig, RandomSource, Result};
use serde::{Deserialize, Serialize};

/// Smallest and largest values `sigmoid` returns
const SIGMOID_FLOOR: f64 = f64::MIN_POSITIVE;
const SIGMOID_CEIL: f64 = 1.0 - f64::EPSILON;

/// Logistic nonlinearity.
///
/// Strictly inside `(0, 1)` for every real input: where `f64` would round the
/// logistic curve to exactly 0 or 1 the result is held at the nearest
/// representable interior value.
pub fn sigmoid(x: f64) -> f64 {
    (1.0 / (1.0 + (-x).exp())).clamp(SIGMOID_FLOOR, SIGMOID_CEIL)
}

/// `sigmoid(sum(inputs[i] * weights[i]) + bias)` where the bias is the last weight.
///
/// # Panics
///
/// Panics if `weights.len() != inputs.len() + 1`. A network that reaches this
/// point has already been shape-checked, so a mismatch is a bug in the caller.
pub fn activate_neuron(inputs: &[f64], weights: &[f64]) -> f64 {
    assert_eq!(
        weights.len(),
        inputs.len() + 1,
        "neuron has {} weights for {} inputs",
        weights.len(),
        inputs.len()
    );
    let (synapses, bias) = weights.split_at(inputs.len());
    let total: f64 = inputs
        .iter()
        .zip(synapses)
        .map(|(input, weight)| input * weight)
        .sum();
    sigmoid(total + bias[0])
}

/// Apply every neuron of `layer` to the same `inputs`.
pub fn activate_layer(inputs: &[f64], layer: &Layer) -> Vec<f64> {
    layer
        .neurons
        .iter()
        .map(|neuron| activate_neuron(inputs, &neuron.weights))
        .collect()
}

fn activate_layer_into(inputs: &[f64], layer: &Layer, out: &mut [f64]) {
    for (slot, neuron) in out.iter_mut().zip(&layer.neurons) {
        *slot = activate_neuron(inputs, &neuron.weights);
    }
}

/// Pure forward pass: thread `input` through every layer and return the last layer's output.
pub fn activate_network(network: &Network, input: &[f64]) -> Result<Vec<f64>> {
    network.check_input(input)?;
    Ok(network
        .layers
        .iter()
        .fold(input.to_vec(), |signal, layer| activate_layer(&signal, layer)))
}

/// One neuron: `N` input weights followed by a bias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub weights: Vec<f64>,
}

impl Neuron {
    /// Draw `inputs + 1` weights uniformly from `(-max_weight, max_weight)`
    pub fn random<R: RandomSource + ?Sized>(inputs: usize, max_weight: f64, rng: &mut R) -> Self {
        let weights = (0..=inputs)
            .map(|_| rng.uniform(-max_weight, max_weight))
            .collect();
        Self { weights }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub neurons: Vec<Neuron>,
}

impl Layer {
    /// `width` neurons, each reading `width` inputs
    pub fn random<R: RandomSource + ?Sized>(width: usize, max_weight: f64, rng: &mut R) -> Self {
        let neurons = (0..width)
            .map(|_| Neuron::random(width, max_weight, rng))
            .collect();
        Self { neurons }
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }
}

/// `L` square layers of `N` neurons.
///
/// Cloning is a full structural copy, which is how offspring inherit a genotype.
/// Deserialized networks are shape-checked like [`Network::from_weights`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct Network {
    layers: Vec<Layer>,
    width: usize,
}

/// Unchecked wire form of a [`Network`]
#[derive(Deserialize)]
struct RawNetwork {
    layers: Vec<Layer>,
    width: usize,
}

impl TryFrom<RawNetwork> for Network {
    type Error = Error;

    fn try_from(raw: RawNetwork) -> Result<Self> {
        let network = Self {
            layers: raw.layers,
            width: raw.width,
        };
        validate_network(&network)?;
        Ok(network)
    }
}

impl Network {
    /// Random genotype of the configured shape
    pub fn random<R: RandomSource + ?Sized>(config: &NetworkConfig, rng: &mut R) -> Self {
        let layers = (0..config.layers)
            .map(|_| Layer::random(config.neurons, config.max_weight, rng))
            .collect();
        Self {
            layers,
            width: config.neurons,
        }
    }

    /// Build from raw weights, rejecting anything that is not `L x N x (N + 1)`
    pub fn from_weights(weights: Vec<Vec<Vec<f64>>>) -> Result<Self> {
        let width = weights.first().map(|layer| layer.len()).unwrap_or(0);
        let layers = weights
            .into_iter()
            .map(|layer| Layer {
                neurons: layer.into_iter().map(|weights| Neuron { weights }).collect(),
            })
            .collect();
        let network = Self { layers, width };
        validate_network(&network)?;
        Ok(network)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of weight layers (L)
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Neurons per layer, equal to the input and output width (N)
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn weight_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| &layer.neurons)
            .map(|neuron| neuron.weights.len())
            .sum()
    }

    pub fn weight(&self, layer: usize, neuron: usize, index: usize) -> Option<f64> {
        self.layers
            .get(layer)?
            .neurons
            .get(neuron)?
            .weights
            .get(index)
            .copied()
    }

    pub fn weight_mut(&mut self, layer: usize, neuron: usize, index: usize) -> Option<&mut f64> {
        self.layers
            .get_mut(layer)?
            .neurons
            .get_mut(neuron)?
            .weights
            .get_mut(index)
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.width {
            return Err(Error::mismatch("network input", self.width, input.len()));
        }
        Ok(())
    }

    /// Pure forward pass, see [`activate_network`]
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        activate_network(self, input)
    }

    /// Forward pass that records every layer in `activations`.
    ///
    /// `input` is copied into layer 0 and layer `L` is returned. The buffer is
    /// only a record for inspection; the result is the same as [`Network::forward`].
    pub fn activate<'a>(&self, input: &[f64], activations: &'a mut Activations) -> Result<&'a [f64]> {
        self.check_input(input)?;
        if activations.layers.len() != self.layers.len() + 1 {
            return Err(Error::mismatch(
                "activation layers",
                self.layers.len() + 1,
                activations.layers.len(),
            ));
        }
        if let Some(bad) = activations.layers.iter().find(|l| l.len() != self.width) {
            return Err(Error::mismatch("activation width", self.width, bad.len()));
        }

        activations.layers[0].copy_from_slice(input);
        for (index, layer) in self.layers.iter().enumerate() {
            let (done, rest) = activations.layers.split_at_mut(index + 1);
            activate_layer_into(&done[index], layer, &mut rest[0]);
        }
        Ok(activations.output())
    }
}

/// Per-layer neuron outputs from the most recent forward pass.
///
/// Layer 0 holds the external inputs and layer `L` the outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activations {
    layers: Vec<Vec<f64>>,
}

impl Activations {
    /// `L + 1` zeroed layers of `N` values
    pub fn new(depth: usize, width: usize) -> Self {
        Self {
            layers: vec![vec![0.0; width]; depth + 1],
        }
    }

    pub fn for_network(network: &Network) -> Self {
        Self::new(network.depth(), network.width())
    }

    pub fn layers(&self) -> &[Vec<f64>] {
        &self.layers
    }

    pub fn input(&self) -> &[f64] {
        &self.layers[0]
    }

    pub fn output(&self) -> &[f64] {
        self.layers.last().map(Vec::as_slice).unwrap_or(&[])
    }
}
