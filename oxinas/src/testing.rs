//! A minimal genome and evaluator used by the crate's unit tests.
use crate::{Evaluator, Genome, Retrained};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Toy(Vec<u8>);

impl Toy {
    pub(crate) fn of(values: &[u8]) -> Toy {
        Toy(values.to_vec())
    }

    pub(crate) fn values(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Toy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toy{:?}", self.0)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ToyConfig {
    pub(crate) max_len: usize,
    pub(crate) values: Vec<u8>,
    pub(crate) mutation_rate: f32,
    pub(crate) strict_mating: bool,
}

impl Default for ToyConfig {
    fn default() -> ToyConfig {
        ToyConfig {
            max_len: 3,
            values: vec![1, 2, 3, 4],
            mutation_rate: 0.2,
            strict_mating: false,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ToyError {
    #[error("no candidate values")]
    Empty,
    #[error("length mismatch")]
    LengthMismatch,
}

impl Genome for Toy {
    type Config = ToyConfig;
    type Error = ToyError;

    fn validate_config(config: &ToyConfig) -> Result<(), ToyError> {
        if config.values.is_empty() || config.max_len == 0 {
            return Err(ToyError::Empty);
        }
        Ok(())
    }

    fn random<R: Rng + ?Sized>(config: &ToyConfig, rng: &mut R) -> Result<Toy, ToyError> {
        let len = rng.gen_range(1..=config.max_len);
        (0..len)
            .map(|_| config.values.choose(rng).copied().ok_or(ToyError::Empty))
            .collect::<Result<_, _>>()
            .map(Toy)
    }

    fn mate<R: Rng + ?Sized>(
        parent1: &Toy,
        parent2: &Toy,
        config: &ToyConfig,
        rng: &mut R,
    ) -> Result<Toy, ToyError> {
        if config.strict_mating && parent1.0.len() != parent2.0.len() {
            return Err(ToyError::LengthMismatch);
        }
        Ok(Toy(parent1
            .0
            .iter()
            .zip(&parent2.0)
            .map(|(a, b)| if rng.gen::<bool>() { *a } else { *b })
            .collect()))
    }

    fn mutate<R: Rng + ?Sized>(&self, config: &ToyConfig, rng: &mut R) -> Result<Toy, ToyError> {
        self.0
            .iter()
            .map(|v| {
                if rng.gen::<f32>() < config.mutation_rate {
                    config.values.choose(rng).copied().ok_or(ToyError::Empty)
                } else {
                    Ok(*v)
                }
            })
            .collect::<Result<_, _>>()
            .map(Toy)
    }

    fn size(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Error)]
pub(crate) enum ToyEvaluationError {
    #[error("genome contains the poisoned value {0}")]
    Poisoned(u8),
    #[error("the data source is unavailable")]
    Unavailable,
}

/// Scores a toy genome by the mean of its values, scaled into [0, 1].
/// Genomes containing `poison` fail; if `fatal` is set, failures abort.
pub(crate) struct ToyEvaluator {
    pub(crate) poison: Option<u8>,
    pub(crate) fatal: bool,
}

impl Evaluator<Toy> for ToyEvaluator {
    type Model = Vec<u8>;
    type Error = ToyEvaluationError;

    fn evaluate(&self, genome: &Toy, _seed: u64) -> Result<f32, ToyEvaluationError> {
        if let Some(poison) = self.poison.filter(|p| genome.0.contains(p)) {
            return Err(if self.fatal {
                ToyEvaluationError::Unavailable
            } else {
                ToyEvaluationError::Poisoned(poison)
            });
        }
        let sum: u32 = genome.0.iter().map(|v| *v as u32).sum();
        Ok(sum as f32 / (genome.0.len().max(1) as f32 * 10.0))
    }

    fn retrain(
        &self,
        genome: &Toy,
        seed: u64,
    ) -> Result<Retrained<Vec<u8>>, ToyEvaluationError> {
        Ok(Retrained {
            model: genome.0.clone(),
            accuracy: self.evaluate(genome, seed)?,
        })
    }

    fn is_fatal(&self, error: &ToyEvaluationError) -> bool {
        matches!(error, ToyEvaluationError::Unavailable)
    }
}
