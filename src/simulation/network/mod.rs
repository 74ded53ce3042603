//! Feedforward neural network used as a vehicle controller.
//!
//! The network is a chain of [`Layer`]s built from a topology `[n0, n1, ..., nk]`.
//! Its parameters travel to and from a [`Genome`](super::genome::Genome) as a flat
//! vector laid out layer by layer, and within a layer as
//! `[bias_0, w_{0,0}, w_{1,0}, ..., bias_1, w_{0,1}, ...]`.

use ndarray::{Array1, ArrayView1};
use rand::Rng;

use super::error::{Result, ShapeContext, SimulationError};

pub mod layer;

pub use layer::{Activation, Layer};

/// Number of flat parameters required by `topology`: `sum_i (n_i + 1) * n_{i+1}`.
pub fn parameter_count(topology: &[usize]) -> usize {
    topology.windows(2).map(|w| (w[0] + 1) * w[1]).sum()
}

/// Checks that a topology has at least two layers and no empty layer.
pub fn validate_topology(topology: &[usize]) -> Result<()> {
    if topology.len() < 2 {
        return Err(SimulationError::InvalidConfiguration(format!(
            "topology needs at least 2 layers, got {}",
            topology.len()
        )));
    }
    if let Some(pos) = topology.iter().position(|&n| n == 0) {
        return Err(SimulationError::InvalidConfiguration(format!(
            "layer {pos} of the topology has no neurons"
        )));
    }
    Ok(())
}

/// Feedforward network over a fixed topology.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    topology: Vec<usize>,
    layers: Vec<Layer>,
}

impl NeuralNetwork {
    /// Allocates a zeroed network for `topology`.
    pub fn new(topology: &[usize]) -> Result<Self> {
        validate_topology(topology)?;
        let layers = topology
            .windows(2)
            .map(|w| Layer::zeros(w[0], w[1]))
            .collect();
        Ok(Self {
            topology: topology.to_vec(),
            layers,
        })
    }

    /// Replaces the activation of every layer.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        for layer in &mut self.layers {
            layer.activation = activation;
        }
        self
    }

    /// Layer widths, input first.
    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    /// Ordered layers from input to output.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Width of the input layer.
    pub fn input_size(&self) -> usize {
        self.topology[0]
    }

    /// Width of the output layer.
    pub fn output_size(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    /// Length of the flat parameter vector.
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Zeroes every bias and draws every weight from `[shift, shift + range)`.
    pub fn initialize_random<R: Rng + ?Sized>(&mut self, range: f64, shift: f64, rng: &mut R) {
        for layer in &mut self.layers {
            layer.initialize_random(range, shift, rng);
        }
    }

    /// Decodes a flat parameter vector into the layers.
    pub fn set_parameters(&mut self, parameters: &[f64]) -> Result<()> {
        let expected = self.parameter_count();
        if parameters.len() != expected {
            return Err(SimulationError::shape(
                ShapeContext::Parameters,
                expected,
                parameters.len(),
            ));
        }
        let mut rest = parameters;
        for layer in &mut self.layers {
            rest = layer.read_parameters(rest);
        }
        Ok(())
    }

    /// Encodes all biases and weights into a flat vector.
    pub fn parameters(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.parameter_count());
        for layer in &self.layers {
            layer.write_parameters(&mut flat);
        }
        flat
    }

    /// Runs a forward pass through every layer.
    pub fn feed_forward(&self, input: &[f64]) -> Result<Array1<f64>> {
        if input.len() != self.input_size() {
            return Err(SimulationError::shape(
                ShapeContext::NetworkInput,
                self.input_size(),
                input.len(),
            ));
        }
        let mut output = self.layers[0].forward(ArrayView1::from(input));
        for layer in &self.layers[1..] {
            output = layer.forward(output.view());
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn parameter_count_matches_formula() {
        for topology in [vec![5, 2], vec![5, 4, 2], vec![3, 8, 8, 2], vec![1, 1]] {
            let net = NeuralNetwork::new(&topology).unwrap();
            assert_eq!(net.parameters().len(), parameter_count(&topology));
            assert_eq!(net.parameter_count(), parameter_count(&topology));
        }
        assert_eq!(parameter_count(&[5, 4, 2]), 6 * 4 + 5 * 2);
    }

    #[test]
    fn rejects_short_or_empty_topologies() {
        assert!(matches!(
            NeuralNetwork::new(&[5]),
            Err(SimulationError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            NeuralNetwork::new(&[]),
            Err(SimulationError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            NeuralNetwork::new(&[3, 0, 2]),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn set_then_get_returns_same_vector() {
        let mut net = NeuralNetwork::new(&[5, 4, 2]).unwrap();
        let v: Vec<f64> = (0..net.parameter_count())
            .map(|i| i as f64 * 0.37 - 3.1)
            .collect();
        net.set_parameters(&v).unwrap();
        assert_eq!(net.parameters(), v);

        let mut fresh = NeuralNetwork::new(&[5, 4, 2]).unwrap();
        fresh.set_parameters(&net.parameters()).unwrap();
        assert_eq!(fresh, net);
    }

    #[test]
    fn set_parameters_rejects_wrong_length() {
        let mut net = NeuralNetwork::new(&[3, 2]).unwrap();
        let err = net.set_parameters(&[0.0; 7]).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::ShapeMismatch {
                context: ShapeContext::Parameters,
                expected: 8,
                actual: 7
            }
        ));
    }

    #[test]
    fn zero_network_outputs_zero() {
        let net = NeuralNetwork::new(&[5, 4, 2]).unwrap();
        let out = net.feed_forward(&[0.0; 5]).unwrap();
        assert_eq!(out.to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn feed_forward_rejects_wrong_input_width() {
        let net = NeuralNetwork::new(&[5, 4, 2]).unwrap();
        let err = net.feed_forward(&[1.0; 4]).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::ShapeMismatch {
                context: ShapeContext::NetworkInput,
                expected: 5,
                actual: 4
            }
        ));
    }

    #[test]
    fn feed_forward_matches_hand_computation() {
        let mut net = NeuralNetwork::new(&[2, 1]).unwrap();
        // bias, w_{0,0}, w_{1,0}
        net.set_parameters(&[0.1, 0.5, -0.25]).unwrap();
        let out = net.feed_forward(&[2.0, 4.0]).unwrap();
        assert_eq!(out[0], (0.1 + 2.0 * 0.5 + 4.0 * -0.25_f64).tanh());
    }

    #[test]
    fn activation_override_applies_to_every_layer() {
        let mut net = NeuralNetwork::new(&[2, 2, 1])
            .unwrap()
            .with_activation(Activation::Identity);
        assert!(net.layers().iter().all(|l| l.activation == Activation::Identity));
        // the output neuron passes the first hidden neuron through unchanged
        net.set_parameters(&[0.1, 0.5, -0.25, -1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
            .unwrap();
        let out = net.feed_forward(&[2.0, 4.0]).unwrap();
        let hidden = 0.1 + 2.0 * 0.5 + 4.0 * -0.25;
        assert_eq!(out[0], hidden);

        let mut relu = NeuralNetwork::new(&[1, 1])
            .unwrap()
            .with_activation(Activation::Relu);
        relu.set_parameters(&[-1.0, 0.5]).unwrap();
        assert_eq!(relu.feed_forward(&[1.0]).unwrap()[0], 0.0);
    }

    #[test]
    fn random_init_is_reproducible_with_seed() {
        let mut a = NeuralNetwork::new(&[5, 3, 2]).unwrap();
        let mut b = NeuralNetwork::new(&[5, 3, 2]).unwrap();
        a.initialize_random(1.0, -0.5, &mut ChaCha8Rng::seed_from_u64(7));
        b.initialize_random(1.0, -0.5, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a.parameters(), b.parameters());
    }

    #[test]
    fn outputs_stay_within_tanh_range() {
        let mut net = NeuralNetwork::new(&[3, 6, 2]).unwrap();
        net.initialize_random(20.0, -10.0, &mut ChaCha8Rng::seed_from_u64(1));
        let out = net.feed_forward(&[5.0, 0.0, 3.0]).unwrap();
        assert!(out.iter().all(|v| (-1.0..=1.0).contains(v)));
    }
}
