use crate::genomics::ActivationType;

use serde::{Deserialize, Serialize};

/// Slope of leaky ReLU for negative inputs.
pub(crate) const LEAKY_SLOPE: f32 = 0.01;

/// A hidden-layer activation function, resolved
/// from an [`ActivationType`] at build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Activation {
    ReLU,
    LeakyReLU,
    Sigmoid,
    Tanh,
}

impl Activation {
    /// Returns `None` for activations hidden layers can't use.
    pub(crate) fn resolve(activation_type: ActivationType) -> Option<Activation> {
        match activation_type {
            ActivationType::ReLU => Some(Activation::ReLU),
            ActivationType::LeakyReLU => Some(Activation::LeakyReLU),
            ActivationType::Sigmoid => Some(Activation::Sigmoid),
            ActivationType::Tanh => Some(Activation::Tanh),
            ActivationType::Softmax => None,
        }
    }

    pub(crate) fn apply(self, x: f32) -> f32 {
        match self {
            Activation::ReLU => x.max(0.0),
            Activation::LeakyReLU => {
                if x > 0.0 {
                    x
                } else {
                    LEAKY_SLOPE * x
                }
            }
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }

    /// Derivative at input `x`.
    pub(crate) fn derivative(self, x: f32) -> f32 {
        match self {
            Activation::ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    LEAKY_SLOPE
                }
            }
            Activation::Sigmoid => {
                let s = self.apply(x);
                s * (1.0 - s)
            }
            Activation::Tanh => 1.0 - x.tanh().powi(2),
        }
    }
}
