//! A Network is the trainable phenotype of a [`LayerGenome`]:
//! one linear layer per gene, each followed by the gene's
//! activation and optional dropout, and a final linear layer
//! producing one logit per class.
//!
//! [`LayerGenome`]: crate::genomics::LayerGenome
mod activation;
mod errors;
mod layers;

pub use errors::BuildError;

use crate::genomics::LayerGenome;
use activation::Activation;
pub(crate) use layers::LinearGradients;
use layers::{Layer, Linear};

use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fmt;

/// The shape of one of a network's linear layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerShape {
    pub inputs: usize,
    pub outputs: usize,
}

/// A feed-forward classifier network.
///
/// Suports Serde for saving trained parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Network {
    input_dim: usize,
    output_dim: usize,
    layers: Vec<Layer>,
}

/// Saved per-layer state of a training-mode forward pass.
pub(crate) struct Trace {
    saved: Vec<Array2<f32>>,
}

impl Network {
    /// Builds a freshly initialized network from `genome`,
    /// mapping `input_dim` features to `output_dim` logits.
    ///
    /// # Errors
    /// Returns an error if either dimension is zero, or if a
    /// gene has an unsupported activation or dropout rate.
    ///
    /// # Examples
    /// ```
    /// use oxinas_nn::genomics::{ActivationType, Gene, LayerGenome};
    /// use oxinas_nn::networks::{LayerShape, Network};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use std::num::NonZeroUsize;
    ///
    /// let genome = LayerGenome::new(vec![
    ///     Gene::new(NonZeroUsize::new(8).unwrap(), ActivationType::ReLU, Some(0.2)),
    ///     Gene::new(NonZeroUsize::new(4).unwrap(), ActivationType::Tanh, None),
    /// ]);
    /// let network = Network::build(&genome, 10, 3, &mut StdRng::seed_from_u64(0)).unwrap();
    ///
    /// let shapes: Vec<_> = network.layers().map(|s| (s.inputs, s.outputs)).collect();
    /// assert_eq!(shapes, [(10, 8), (8, 4), (4, 3)]);
    /// assert_eq!(network.parameter_count(), 10 * 8 + 8 + 8 * 4 + 4 + 4 * 3 + 3);
    ///
    /// // Without genes, inputs map straight to the logits.
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let network = Network::build(&LayerGenome::default(), 10, 3, &mut rng).unwrap();
    /// let shapes: Vec<_> = network.layers().collect();
    /// assert_eq!(shapes, [LayerShape { inputs: 10, outputs: 3 }]);
    /// ```
    pub fn build<R: Rng + ?Sized>(
        genome: &LayerGenome,
        input_dim: usize,
        output_dim: usize,
        rng: &mut R,
    ) -> Result<Network, BuildError> {
        if input_dim == 0 || output_dim == 0 {
            return Err(BuildError::ZeroWidth {
                input_dim,
                output_dim,
            });
        }

        let mut layers = Vec::with_capacity(genome.len() * 3 + 1);
        let mut width = input_dim;
        for (index, gene) in genome.genes().enumerate() {
            let activation = Activation::resolve(gene.activation()).ok_or(
                BuildError::UnsupportedActivation {
                    layer: index + 1,
                    activation: gene.activation(),
                },
            )?;
            let neurons = gene.num_neurons().get();
            layers.push(Layer::Linear(Linear::random(width, neurons, rng)));
            layers.push(Layer::Activation(activation));
            if let Some(rate) = gene.dropout_rate() {
                if !(rate > 0.0 && rate < 1.0) {
                    return Err(BuildError::InvalidDropout {
                        layer: index + 1,
                        rate,
                    });
                }
                layers.push(Layer::Dropout(rate));
            }
            width = neurons;
        }
        layers.push(Layer::Linear(Linear::random(width, output_dim, rng)));

        Ok(Network {
            input_dim,
            output_dim,
            layers,
        })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// Returns the shapes of the network's linear layers,
    /// from input to output.
    pub fn layers(&self) -> impl Iterator<Item = LayerShape> + '_ {
        self.linear_layers().map(|linear| LayerShape {
            inputs: linear.inputs(),
            outputs: linear.outputs(),
        })
    }

    /// Returns the number of trainable parameters.
    pub fn parameter_count(&self) -> usize {
        self.linear_layers()
            .map(|linear| linear.weights.len() + linear.bias.len())
            .sum()
    }

    /// Returns the logits for every row of `features`,
    /// in inference mode (no dropout).
    ///
    /// # Panics
    /// Panics if `features` doesn't have `input_dim` columns.
    pub fn predict(&self, features: ArrayView2<f32>) -> Array2<f32> {
        self.layers
            .iter()
            .fold(features.to_owned(), |x, layer| layer.forward(x))
    }

    /// Returns the predicted class of every row of `features`.
    pub fn classify(&self, features: ArrayView2<f32>) -> Vec<usize> {
        argmax_rows(&self.predict(features))
    }

    /// Training-mode forward pass, with dropout active.
    pub(crate) fn forward_train<R: Rng + ?Sized>(
        &self,
        features: ArrayView2<f32>,
        rng: &mut R,
    ) -> (Array2<f32>, Trace) {
        let mut saved = Vec::with_capacity(self.layers.len());
        let mut x = features.to_owned();
        for layer in &self.layers {
            let (output, state) = layer.forward_train(x, rng);
            saved.push(state);
            x = output;
        }
        (x, Trace { saved })
    }

    /// Backpropagates the gradient of the loss with respect to
    /// the logits. Returns the gradients of every linear layer,
    /// from input to output.
    pub(crate) fn backward(&self, trace: Trace, grad_logits: Array2<f32>) -> Vec<LinearGradients> {
        let mut gradients = Vec::new();
        let mut grad = grad_logits;
        for (layer, saved) in self.layers.iter().zip(&trace.saved).rev() {
            let (input_grad, linear_gradients) = layer.backward(saved, grad);
            gradients.extend(linear_gradients);
            grad = input_grad;
        }
        gradients.reverse();
        gradients
    }

    pub(crate) fn linear_layers(&self) -> impl Iterator<Item = &Linear> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Linear(linear) => Some(linear),
            _ => None,
        })
    }

    pub(crate) fn linear_layers_mut(&mut self) -> impl Iterator<Item = &mut Linear> {
        self.layers.iter_mut().filter_map(|layer| match layer {
            Layer::Linear(linear) => Some(linear),
            _ => None,
        })
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shapes: Vec<String> = self
            .layers()
            .map(|s| format!("{}->{}", s.inputs, s.outputs))
            .collect();
        write!(
            f,
            "Network[{}, {} parameters]",
            shapes.join(", "),
            self.parameter_count()
        )
    }
}

/// Returns the index of the first maximum of every row.
pub(crate) fn argmax_rows(scores: &Array2<f32>) -> Vec<usize> {
    scores
        .axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (i, &x)| {
                    if x > best.1 {
                        (i, x)
                    } else {
                        best
                    }
                })
                .0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{ActivationType, Gene};
    use crate::training::{CrossEntropy, Loss};

    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use std::num::NonZeroUsize;

    fn gene(n: usize, activation: ActivationType, dropout: Option<f32>) -> Gene {
        Gene::new(NonZeroUsize::new(n).unwrap(), activation, dropout)
    }

    #[test]
    fn layer_widths_chain() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in 1..4 {
            let genome = LayerGenome::new(
                (0..n)
                    .map(|i| gene(4 << i, ActivationType::Sigmoid, None))
                    .collect(),
            );
            let network = Network::build(&genome, 7, 2, &mut rng).unwrap();
            let shapes: Vec<LayerShape> = network.layers().collect();
            assert_eq!(shapes.len(), n + 1);
            assert_eq!(shapes[0].inputs, 7);
            assert_eq!(shapes[n].outputs, 2);
            for pair in shapes.windows(2) {
                assert_eq!(pair[0].outputs, pair[1].inputs);
            }
        }
    }

    #[test]
    fn initialization_respects_fan_in() {
        let mut rng = StdRng::seed_from_u64(2);
        let genome = LayerGenome::new(vec![gene(16, ActivationType::ReLU, None)]);
        let network = Network::build(&genome, 25, 3, &mut rng).unwrap();
        for linear in network.linear_layers() {
            let bound = 1.0 / (linear.inputs() as f32).sqrt();
            assert!(linear.weights.iter().chain(&linear.bias).all(|w| w.abs() <= bound));
        }
    }

    #[test]
    fn build_errors() {
        let mut rng = StdRng::seed_from_u64(3);
        let genome = LayerGenome::new(vec![
            gene(4, ActivationType::ReLU, None),
            gene(4, ActivationType::Softmax, None),
        ]);
        assert_eq!(
            Network::build(&genome, 3, 2, &mut rng),
            Err(BuildError::UnsupportedActivation {
                layer: 2,
                activation: ActivationType::Softmax
            })
        );

        let genome = LayerGenome::new(vec![gene(4, ActivationType::ReLU, Some(1.0))]);
        assert!(matches!(
            Network::build(&genome, 3, 2, &mut rng),
            Err(BuildError::InvalidDropout { layer: 1, .. })
        ));

        assert!(matches!(
            Network::build(&LayerGenome::default(), 0, 2, &mut rng),
            Err(BuildError::ZeroWidth { .. })
        ));
    }

    #[test]
    fn dropout_is_inactive_at_inference() {
        let mut rng = StdRng::seed_from_u64(4);
        let genome = LayerGenome::new(vec![gene(8, ActivationType::Tanh, Some(0.5))]);
        let network = Network::build(&genome, 3, 2, &mut rng).unwrap();
        let x = array![[0.1, -0.4, 0.9], [1.0, 0.0, -1.0]];
        assert_eq!(network.predict(x.view()), network.predict(x.view()));
        assert_eq!(network.classify(x.view()).len(), 2);
    }

    #[test]
    fn gradients_match_finite_differences() {
        let mut rng = StdRng::seed_from_u64(5);
        let genome = LayerGenome::new(vec![
            gene(5, ActivationType::Tanh, None),
            gene(4, ActivationType::Sigmoid, None),
            gene(3, ActivationType::Tanh, None),
        ]);
        let mut network = Network::build(&genome, 3, 2, &mut rng).unwrap();
        let x = array![[0.5, -1.0, 0.25], [-0.3, 0.8, 1.2], [0.9, 0.1, -0.7]];
        let t = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0]];
        let loss = CrossEntropy;

        let (logits, trace) = network.forward_train(x.view(), &mut rng);
        let (_, grad) = loss.evaluate(&logits, &t);
        let analytic = network.backward(trace, grad);
        assert_eq!(analytic.len(), 4);

        let h = 1e-2;
        let layer_count = analytic.len();
        for layer in 0..layer_count {
            let shape = analytic[layer].weights.dim();
            for (i, j) in [(0, 0), (shape.0 - 1, shape.1 - 1)] {
                let original = network.linear_layers_mut().nth(layer).unwrap().weights[[i, j]];
                let mut loss_at = |value: f32| {
                    network.linear_layers_mut().nth(layer).unwrap().weights[[i, j]] = value;
                    loss.evaluate(&network.predict(x.view()), &t).0
                };
                let numeric = (loss_at(original + h) - loss_at(original - h)) / (2.0 * h);
                loss_at(original);
                let expected = analytic[layer].weights[[i, j]];
                assert!(
                    (numeric - expected).abs() < 2e-3,
                    "layer {} weight ({}, {}): numeric {} analytic {}",
                    layer,
                    i,
                    j,
                    numeric,
                    expected
                );
            }
            let bias = analytic[layer].bias[0];
            let original = network.linear_layers_mut().nth(layer).unwrap().bias[0];
            let mut loss_at = |value: f32| {
                network.linear_layers_mut().nth(layer).unwrap().bias[0] = value;
                loss.evaluate(&network.predict(x.view()), &t).0
            };
            let numeric = (loss_at(original + h) - loss_at(original - h)) / (2.0 * h);
            loss_at(original);
            assert!((numeric - bias).abs() < 2e-3);
        }
    }

    #[test]
    fn serde_round_trip_keeps_parameters() {
        let mut rng = StdRng::seed_from_u64(6);
        let genome = LayerGenome::new(vec![gene(4, ActivationType::ReLU, Some(0.1))]);
        let network = Network::build(&genome, 3, 2, &mut rng).unwrap();
        let json = serde_json::to_string(&network).unwrap();
        let restored: Network = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, network);
    }
}
