use crate::genomics::ActivationType;

use serde::{Deserialize, Serialize};

use std::fmt;
use std::num::NonZeroUsize;

/// Genes are the principal components of genomes.
/// Each describes one hidden layer: its width, the
/// activation following it, and an optional dropout.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Gene {
    num_neurons: NonZeroUsize,
    activation: ActivationType,
    dropout_rate: Option<f32>,
}

impl Gene {
    /// Returns a new gene with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use oxinas_nn::genomics::{ActivationType, Gene};
    /// use std::num::NonZeroUsize;
    ///
    /// let gene = Gene::new(NonZeroUsize::new(32).unwrap(), ActivationType::Tanh, Some(0.2));
    /// assert_eq!(gene.num_neurons().get(), 32);
    /// assert_eq!(gene.to_string(), "32 tanh (dropout 0.2)");
    /// ```
    pub fn new(
        num_neurons: NonZeroUsize,
        activation: ActivationType,
        dropout_rate: Option<f32>,
    ) -> Gene {
        Gene {
            num_neurons,
            activation,
            dropout_rate,
        }
    }

    /// Returns the width of the gene's layer.
    pub fn num_neurons(&self) -> NonZeroUsize {
        self.num_neurons
    }

    pub fn activation(&self) -> ActivationType {
        self.activation
    }

    /// Returns the dropout rate following the layer's
    /// activation, if any.
    pub fn dropout_rate(&self) -> Option<f32> {
        self.dropout_rate
    }

    /// Returns a gene whose every attribute is taken from
    /// `self` or `other` with equal probability.
    pub(super) fn uniform_crossover<R: rand::Rng + ?Sized>(
        &self,
        other: &Gene,
        rng: &mut R,
    ) -> Gene {
        Gene {
            num_neurons: if rng.gen() { self.num_neurons } else { other.num_neurons },
            activation: if rng.gen() { self.activation } else { other.activation },
            dropout_rate: if rng.gen() { self.dropout_rate } else { other.dropout_rate },
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.num_neurons, self.activation)?;
        if let Some(rate) = self.dropout_rate {
            write!(f, " (dropout {})", rate)?;
        }
        Ok(())
    }
}
