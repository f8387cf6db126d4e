//! Fitness of layer genomes: build the encoded network,
//! train it, and score it by validation accuracy.
use crate::data::DataProvider;
use crate::genomics::LayerGenome;
use crate::networks::{BuildError, Network};
use crate::training::{self, CrossEntropy, Loss, TrainingConfig, TrainingError};
use crate::ConfigError;

use log::debug;
use oxinas::{Evaluator, Retrained};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

/// An error type indicating a genome could not be scored.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("failed to build network: {0}")]
    Build(#[from] BuildError),
    #[error(transparent)]
    Training(#[from] TrainingError),
}

/// Scores genomes by training the networks they encode
/// on the provider's training data, then measuring their
/// accuracy on its validation data.
#[derive(Clone, Debug)]
pub struct TrainingEvaluator<L = CrossEntropy> {
    provider: DataProvider,
    loss: L,
    config: TrainingConfig,
}

impl TrainingEvaluator<CrossEntropy> {
    /// Returns an evaluator training with softmax cross-entropy.
    ///
    /// # Errors
    /// Returns an error if the training configuration is invalid.
    pub fn new(
        provider: DataProvider,
        config: TrainingConfig,
    ) -> Result<TrainingEvaluator<CrossEntropy>, ConfigError> {
        TrainingEvaluator::with_loss(provider, CrossEntropy, config)
    }
}

impl<L: Loss> TrainingEvaluator<L> {
    pub fn with_loss(
        provider: DataProvider,
        loss: L,
        config: TrainingConfig,
    ) -> Result<TrainingEvaluator<L>, ConfigError> {
        config.validate()?;
        Ok(TrainingEvaluator {
            provider,
            loss,
            config,
        })
    }

    pub fn provider(&self) -> &DataProvider {
        &self.provider
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Builds and trains a fresh network from `genome`, returning
    /// it with its validation accuracy. All randomness (parameter
    /// initialization, shuffling, dropout) derives from `seed`.
    pub fn train_genome(
        &self,
        genome: &LayerGenome,
        seed: u64,
    ) -> Result<(Network, f32), EvaluationError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut network = Network::build(
            genome,
            self.provider.input_dim(),
            self.provider.num_classes(),
            &mut rng,
        )?;
        let report = training::train(
            &mut network,
            &self.provider,
            &self.loss,
            &self.config,
            &mut rng,
        )?;
        let accuracy = training::accuracy(&network, self.provider.val_batches());
        debug!(
            "trained {} ({} parameters), final loss {:.4}, validation accuracy {:.4}",
            genome,
            network.parameter_count(),
            report.final_loss().unwrap_or(f32::NAN),
            accuracy
        );
        Ok((network, accuracy))
    }
}

impl<L: Loss> Evaluator<LayerGenome> for TrainingEvaluator<L> {
    type Model = Network;
    type Error = EvaluationError;

    fn evaluate(&self, genome: &LayerGenome, seed: u64) -> Result<f32, EvaluationError> {
        self.train_genome(genome, seed).map(|(_, accuracy)| accuracy)
    }

    fn retrain(
        &self,
        genome: &LayerGenome,
        seed: u64,
    ) -> Result<Retrained<Network>, EvaluationError> {
        let (model, accuracy) = self.train_genome(genome, seed)?;
        Ok(Retrained { model, accuracy })
    }

    /// Data errors would fail every genome alike.
    fn is_fatal(&self, error: &EvaluationError) -> bool {
        matches!(error, EvaluationError::Training(TrainingError::Data(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::genomics::{ActivationType, Gene};

    use std::num::NonZeroUsize;

    fn evaluator(epochs: usize) -> TrainingEvaluator {
        let mut rng = StdRng::seed_from_u64(10);
        let (train, validation) = Dataset::gaussian_blobs(20, 5, 3, 0.4, &mut rng)
            .unwrap()
            .split(0.75, &mut rng)
            .unwrap();
        let provider = DataProvider::new(train, validation, NonZeroUsize::new(4).unwrap()).unwrap();
        let config = TrainingConfig {
            learning_rate: 0.01,
            epochs: NonZeroUsize::new(epochs).unwrap(),
            ..TrainingConfig::default()
        };
        TrainingEvaluator::new(provider, config).unwrap()
    }

    fn genome(activation: ActivationType) -> LayerGenome {
        LayerGenome::new(vec![Gene::new(NonZeroUsize::new(8).unwrap(), activation, Some(0.1))])
    }

    #[test]
    fn same_seed_same_fitness() {
        let evaluator = evaluator(3);
        let genome = genome(ActivationType::ReLU);
        let first = evaluator.evaluate(&genome, 99).unwrap();
        assert!((0.0..=1.0).contains(&first));
        assert_eq!(evaluator.evaluate(&genome, 99).unwrap(), first);
    }

    #[test]
    fn softmax_genomes_fail_without_aborting() {
        let evaluator = evaluator(1);
        let error = evaluator
            .evaluate(&genome(ActivationType::Softmax), 0)
            .unwrap_err();
        assert!(matches!(
            error,
            EvaluationError::Build(BuildError::UnsupportedActivation { .. })
        ));
        assert!(!evaluator.is_fatal(&error));
    }

    #[test]
    fn retrained_model_matches_reported_accuracy() {
        let evaluator = evaluator(5);
        let retrained = evaluator.retrain(&genome(ActivationType::Tanh), 4).unwrap();
        let accuracy = training::accuracy(&retrained.model, evaluator.provider().val_batches());
        assert_eq!(accuracy, retrained.accuracy);
        assert_eq!(retrained.model.input_dim(), 5);
        assert_eq!(retrained.model.output_dim(), 3);
    }

    #[test]
    fn invalid_training_config_is_rejected() {
        let provider = evaluator(1).provider().clone();
        let config = TrainingConfig {
            learning_rate: -1.0,
            ..TrainingConfig::default()
        };
        assert!(TrainingEvaluator::new(provider, config).is_err());
    }
}
