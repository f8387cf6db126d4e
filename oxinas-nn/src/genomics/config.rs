use crate::genomics::ActivationType;
use crate::ConfigError;

use log::warn;
use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

const fn non_zero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("layer counts and widths must be non-zero"),
    }
}

fn neurons(widths: &[usize]) -> Vec<NonZeroUsize> {
    widths.iter().filter_map(|n| NonZeroUsize::new(*n)).collect()
}

/// The candidate values initial genomes are drawn from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blueprint {
    /// Maximum number of hidden layers in a genome.
    pub max_n_layers: NonZeroUsize,
    /// Candidate layer widths.
    pub neurons: Vec<NonZeroUsize>,
    /// Candidate activations. May not contain [`Softmax`].
    ///
    /// [`Softmax`]: ActivationType::Softmax
    pub activations: Vec<ActivationType>,
    /// Candidate dropout rates, `None` meaning no dropout.
    pub dropout: Vec<Option<f32>>,
}

impl Default for Blueprint {
    fn default() -> Blueprint {
        Blueprint {
            max_n_layers: non_zero(5),
            neurons: neurons(&[4, 8, 16, 32, 64, 128, 256]),
            activations: vec![
                ActivationType::ReLU,
                ActivationType::LeakyReLU,
                ActivationType::Sigmoid,
                ActivationType::Tanh,
            ],
            dropout: vec![None, Some(0.1), Some(0.2), Some(0.3), Some(0.4), Some(0.5)],
        }
    }
}

/// The candidate values genes are resampled from
/// during mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Chance of each gene being resampled.
    pub mutation_rate: f32,
    pub neurons: Vec<NonZeroUsize>,
    /// Candidate activations. [`Softmax`] is allowed here,
    /// but networks built from genes carrying it fail.
    ///
    /// [`Softmax`]: ActivationType::Softmax
    pub activations: Vec<ActivationType>,
    pub dropout: Vec<Option<f32>>,
}

impl Default for MutationConfig {
    fn default() -> MutationConfig {
        MutationConfig {
            mutation_rate: 0.1,
            neurons: neurons(&[4, 8, 16, 32]),
            activations: vec![
                ActivationType::ReLU,
                ActivationType::Sigmoid,
                ActivationType::Tanh,
                ActivationType::Softmax,
            ],
            dropout: vec![None, Some(0.1), Some(0.2), Some(0.3)],
        }
    }
}

/// Configuration data for genome generation
/// and inter-genome operations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    pub blueprint: Blueprint,
    pub mutation: MutationConfig,
}

impl GeneticConfig {
    /// Checks that genomes can be generated and mutated
    /// with this configuration.
    ///
    /// # Examples
    /// ```
    /// use oxinas_nn::genomics::{ActivationType, GeneticConfig};
    ///
    /// let mut config = GeneticConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.blueprint.activations.push(ActivationType::Softmax);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let blueprint = &self.blueprint;
        check_candidates("blueprint neurons", &blueprint.neurons)?;
        check_candidates("blueprint activations", &blueprint.activations)?;
        check_candidates("blueprint dropout", &blueprint.dropout)?;
        check_dropout("blueprint dropout", &blueprint.dropout)?;
        if let Some(activation) = blueprint.activations.iter().find(|a| !a.is_buildable()) {
            return Err(ConfigError::UnsupportedActivation {
                activation: *activation,
                list: "blueprint activations",
            });
        }

        let mutation = &self.mutation;
        if !(0.0..=1.0).contains(&mutation.mutation_rate) {
            return Err(ConfigError::InvalidMutationRate(mutation.mutation_rate));
        }
        check_candidates("mutation neurons", &mutation.neurons)?;
        check_candidates("mutation activations", &mutation.activations)?;
        check_candidates("mutation dropout", &mutation.dropout)?;
        check_dropout("mutation dropout", &mutation.dropout)?;
        for activation in mutation.activations.iter().filter(|a| !a.is_buildable()) {
            warn!(
                "mutation may introduce {} layers, genomes carrying them will fail evaluation",
                activation
            );
        }
        Ok(())
    }
}

fn check_candidates<T>(list: &'static str, candidates: &[T]) -> Result<(), ConfigError> {
    if candidates.is_empty() {
        Err(ConfigError::EmptyCandidates(list))
    } else {
        Ok(())
    }
}

fn check_dropout(list: &'static str, candidates: &[Option<f32>]) -> Result<(), ConfigError> {
    match candidates
        .iter()
        .flatten()
        .find(|rate| !(**rate > 0.0 && **rate < 1.0))
    {
        Some(rate) => Err(ConfigError::InvalidDropout { rate: *rate, list }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GeneticConfig::default().validate(), Ok(()));
        assert_eq!(GeneticConfig::default().blueprint.neurons.len(), 7);
    }

    #[test]
    fn rejects_bad_candidates() {
        let mut config = GeneticConfig::default();
        config.mutation.neurons.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyCandidates("mutation neurons"))
        );

        let mut config = GeneticConfig::default();
        config.blueprint.dropout.push(Some(1.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDropout { list: "blueprint dropout", .. })
        ));

        let mut config = GeneticConfig::default();
        config.mutation.mutation_rate = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMutationRate(1.5)));

        let mut config = GeneticConfig::default();
        config.blueprint.dropout.push(Some(f32::NAN));
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config: GeneticConfig = ron::from_str(
            "(blueprint: (max_n_layers: 2, neurons: [4, 8], \
             activations: [\"relu\"], dropout: [None]))",
        )
        .unwrap();
        assert_eq!(config.blueprint.max_n_layers.get(), 2);
        assert_eq!(config.blueprint.activations, [ActivationType::ReLU]);
        assert_eq!(config.mutation, MutationConfig::default());
    }
}
