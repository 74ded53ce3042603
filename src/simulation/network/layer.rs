//! Fully connected layer with a fixed activation.

use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Elementwise activation applied to a layer's pre-activation output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// Hyperbolic tangent.
    #[default]
    Tanh,
    /// Logistic sigmoid.
    Sigmoid,
    /// Rectified linear unit.
    Relu,
    /// No activation.
    Identity,
}

impl Activation {
    /// Applies the activation to a single value.
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Relu => x.max(0.0),
            Activation::Identity => x,
        }
    }
}

/// A single layer mapping `input_size` values to `output_size` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Weight matrix (`input_size` × `output_size`); `weights[[i, j]]` connects
    /// input `i` to output `j`.
    pub weights: Array2<f64>,
    /// Bias vector (`output_size`).
    pub biases: Array1<f64>,
    /// Activation applied to every output.
    pub activation: Activation,
}

impl Layer {
    /// Creates a layer with all weights and biases set to zero.
    pub fn zeros(input_size: usize, output_size: usize) -> Self {
        Self {
            weights: Array2::zeros((input_size, output_size)),
            biases: Array1::zeros(output_size),
            activation: Activation::default(),
        }
    }

    /// Number of inputs this layer consumes.
    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of outputs this layer produces.
    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of flat parameters: one bias plus `input_size` weights per output.
    pub fn parameter_count(&self) -> usize {
        (self.input_size() + 1) * self.output_size()
    }

    /// Zeroes the biases and draws every weight uniformly from `[shift, shift + range)`.
    pub fn initialize_random<R: Rng + ?Sized>(&mut self, range: f64, shift: f64, rng: &mut R) {
        for j in 0..self.output_size() {
            self.biases[j] = 0.0;
            for i in 0..self.input_size() {
                self.weights[[i, j]] = rng.random::<f64>() * range + shift;
            }
        }
    }

    /// Writes this layer's parameters to `out`, output neuron by output neuron:
    /// the bias followed by every incoming weight.
    pub(super) fn write_parameters(&self, out: &mut Vec<f64>) {
        for j in 0..self.output_size() {
            out.push(self.biases[j]);
            out.extend(self.weights.column(j).iter().copied());
        }
    }

    /// Reads this layer's parameters from the front of `values` in the order
    /// produced by [`Layer::write_parameters`]. Returns the unread tail.
    pub(super) fn read_parameters<'a>(&mut self, values: &'a [f64]) -> &'a [f64] {
        let (own, rest) = values.split_at(self.parameter_count());
        for (j, chunk) in own.chunks_exact(self.input_size() + 1).enumerate() {
            self.biases[j] = chunk[0];
            for (i, &w) in chunk[1..].iter().enumerate() {
                self.weights[[i, j]] = w;
            }
        }
        rest
    }

    /// Performs a forward pass.
    ///
    /// Each output starts from its bias and accumulates `input[i] * weight[i, j]`
    /// in input order before the activation is applied.
    #[inline]
    pub fn forward(&self, inputs: ArrayView1<'_, f64>) -> Array1<f64> {
        Array1::from_shape_fn(self.output_size(), |j| {
            let z = self
                .weights
                .column(j)
                .iter()
                .zip(inputs.iter())
                .fold(self.biases[j], |acc, (w, x)| acc + x * w);
            self.activation.apply(z)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn forward_adds_bias_then_weighted_inputs() {
        let mut layer = Layer::zeros(2, 1);
        layer.activation = Activation::Identity;
        layer.biases[0] = 0.5;
        layer.weights[[0, 0]] = 2.0;
        layer.weights[[1, 0]] = -1.0;

        let out = layer.forward(array![1.0, 3.0].view());
        assert_eq!(out[0], 0.5 + 2.0 - 3.0);
    }

    #[test]
    fn parameters_are_grouped_per_output_neuron() {
        let mut layer = Layer::zeros(2, 2);
        layer.biases = array![10.0, 20.0];
        layer.weights = array![[1.0, 2.0], [3.0, 4.0]];

        let mut flat = Vec::new();
        layer.write_parameters(&mut flat);
        assert_eq!(flat, vec![10.0, 1.0, 3.0, 20.0, 2.0, 4.0]);
    }

    #[test]
    fn random_init_zeroes_biases_and_respects_range() {
        let mut layer = Layer::zeros(4, 3);
        layer.biases.fill(7.0);
        let mut rng = rand::rng();
        layer.initialize_random(1.0, -0.5, &mut rng);

        assert!(layer.biases.iter().all(|&b| b == 0.0));
        assert!(layer.weights.iter().all(|&w| (-0.5..0.5).contains(&w)));
    }
}
