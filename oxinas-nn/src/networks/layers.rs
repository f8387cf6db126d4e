use super::activation::Activation;

use ndarray::{Array1, Array2, Axis, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A fully-connected layer. Weights are
/// stored as an `inputs × outputs` matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Linear {
    pub(crate) weights: Array2<f32>,
    pub(crate) bias: Array1<f32>,
}

impl Linear {
    /// Creates a layer with weights and biases drawn from
    /// `U(-1/sqrt(fan_in), 1/sqrt(fan_in))`.
    pub(crate) fn random<R: Rng + ?Sized>(fan_in: usize, fan_out: usize, rng: &mut R) -> Linear {
        let bound = 1.0 / (fan_in as f32).sqrt();
        let weights = Array2::from_shape_fn((fan_in, fan_out), |_| rng.gen_range(-bound..=bound));
        let bias = Array1::from_shape_fn(fan_out, |_| rng.gen_range(-bound..=bound));
        Linear { weights, bias }
    }

    pub(crate) fn inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub(crate) fn outputs(&self) -> usize {
        self.weights.ncols()
    }

    pub(crate) fn forward(&self, input: &Array2<f32>) -> Array2<f32> {
        input.dot(&self.weights) + &self.bias
    }

    /// Returns the parameter gradients and the gradient
    /// with respect to the layer's input.
    pub(crate) fn backward(
        &self,
        input: &Array2<f32>,
        grad: &Array2<f32>,
    ) -> (LinearGradients, Array2<f32>) {
        let gradients = LinearGradients {
            weights: input.t().dot(grad),
            bias: grad.sum_axis(Axis(0)),
        };
        (gradients, grad.dot(&self.weights.t()))
    }
}

/// Gradients of a [`Linear`] layer's parameters.
#[derive(Clone, Debug)]
pub(crate) struct LinearGradients {
    pub(crate) weights: Array2<f32>,
    pub(crate) bias: Array1<f32>,
}

/// One step of a network's layer stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum Layer {
    Linear(Linear),
    Activation(Activation),
    /// Inverted dropout with the given rate,
    /// active only during training.
    Dropout(f32),
}

impl Layer {
    /// Inference-mode forward pass.
    pub(crate) fn forward(&self, input: Array2<f32>) -> Array2<f32> {
        match self {
            Layer::Linear(linear) => linear.forward(&input),
            Layer::Activation(activation) => input.mapv_into(|x| activation.apply(x)),
            Layer::Dropout(_) => input,
        }
    }

    /// Training-mode forward pass. Returns the output and the
    /// array the backward pass needs: the input for linear and
    /// activation layers, the scaled keep-mask for dropout.
    pub(crate) fn forward_train<R: Rng + ?Sized>(
        &self,
        input: Array2<f32>,
        rng: &mut R,
    ) -> (Array2<f32>, Array2<f32>) {
        match self {
            Layer::Dropout(rate) => {
                let keep = 1.0 / (1.0 - rate);
                let mask = Array2::from_shape_fn(input.raw_dim(), |_| {
                    if rng.gen::<f32>() < *rate {
                        0.0
                    } else {
                        keep
                    }
                });
                (input * &mask, mask)
            }
            layer => (layer.forward(input.clone()), input),
        }
    }

    /// Propagates `grad` back through the layer, returning the
    /// gradient with respect to its input, and the parameter
    /// gradients for linear layers.
    pub(crate) fn backward(
        &self,
        saved: &Array2<f32>,
        mut grad: Array2<f32>,
    ) -> (Array2<f32>, Option<LinearGradients>) {
        match self {
            Layer::Linear(linear) => {
                let (gradients, grad) = linear.backward(saved, &grad);
                (grad, Some(gradients))
            }
            Layer::Activation(activation) => {
                Zip::from(&mut grad)
                    .and(saved)
                    .for_each(|g, &x| *g *= activation.derivative(x));
                (grad, None)
            }
            Layer::Dropout(_) => (grad * saved, None),
        }
    }
}
