//! Supervised training of networks: mini-batch Adam
//! on a classification loss, followed by validation.
mod loss;
mod optimizer;

pub use loss::{softmax, CrossEntropy, Loss};
use optimizer::Adam;

use crate::data::{Batch, DataError, DataProvider};
use crate::networks::Network;
use crate::ConfigError;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

const fn non_zero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("epoch counts must be non-zero"),
    }
}

/// Configuration of a network's training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Adam step size.
    pub learning_rate: f32,
    /// Number of passes over the training batches.
    pub epochs: NonZeroUsize,
    /// Wall-clock limit of one training run, in seconds.
    /// Checked after every epoch but the last.
    pub time_budget_secs: Option<u64>,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        Ok(())
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs)
    }
}

impl Default for TrainingConfig {
    fn default() -> TrainingConfig {
        TrainingConfig {
            learning_rate: 0.001,
            epochs: non_zero(20),
            time_budget_secs: None,
        }
    }
}

/// An error type indicating an aborted training run.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// The data doesn't fit the network.
    #[error(transparent)]
    Data(#[from] DataError),
    /// The loss stopped being a finite number.
    #[error("training diverged in epoch {epoch} (average loss {loss})")]
    Diverged { epoch: usize, loss: f32 },
    /// Training ran past its time budget.
    #[error("time budget of {budget:?} exceeded after {epochs_completed} epoch(s)")]
    BudgetExceeded {
        epochs_completed: usize,
        budget: Duration,
    },
}

/// Per-epoch record of a training run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingReport {
    /// Average batch loss of every epoch.
    pub epoch_losses: Vec<f32>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}

/// Trains `network` in place on the provider's training
/// batches, reshuffled every epoch.
///
/// # Errors
/// Returns an error if the provider's data doesn't fit
/// the network, if the loss diverges, or if the configured
/// time budget runs out.
pub fn train<L, R>(
    network: &mut Network,
    provider: &DataProvider,
    loss: &L,
    config: &TrainingConfig,
    rng: &mut R,
) -> Result<TrainingReport, TrainingError>
where
    L: Loss + ?Sized,
    R: Rng + ?Sized,
{
    check_dimensions(network, provider)?;
    let epochs = config.epochs.get();
    let budget = config.time_budget();
    let start = Instant::now();
    let mut optimizer = Adam::new(network, config.learning_rate);
    let mut epoch_losses = Vec::with_capacity(epochs);

    for epoch in 1..=epochs {
        let mut total = 0.0;
        let mut batches = 0;
        for batch in provider.train_batches(rng) {
            let (logits, trace) = network.forward_train(batch.features.view(), rng);
            let (batch_loss, grad) = loss.evaluate(&logits, &batch.targets);
            let gradients = network.backward(trace, grad);
            optimizer.step(network, &gradients);
            total += batch_loss;
            batches += 1;
        }
        let average = total / batches.max(1) as f32;
        debug!("epoch {}/{}, average loss: {:.4}", epoch, epochs, average);
        if !average.is_finite() {
            return Err(TrainingError::Diverged {
                epoch,
                loss: average,
            });
        }
        epoch_losses.push(average);

        if let Some(budget) = budget {
            if epoch < epochs && start.elapsed() > budget {
                return Err(TrainingError::BudgetExceeded {
                    epochs_completed: epoch,
                    budget,
                });
            }
        }
    }
    Ok(TrainingReport { epoch_losses })
}

/// Returns the fraction of samples whose predicted class
/// (argmax of the logits) matches the one-hot target,
/// in inference mode. Returns 0 if there are no samples.
pub fn accuracy<I: IntoIterator<Item = Batch>>(network: &Network, batches: I) -> f32 {
    let mut correct = 0;
    let mut total = 0;
    for batch in batches {
        let predicted = network.classify(batch.features.view());
        let expected = crate::networks::argmax_rows(&batch.targets);
        correct += predicted
            .iter()
            .zip(&expected)
            .filter(|(p, e)| p == e)
            .count();
        total += expected.len();
    }
    if total == 0 {
        0.0
    } else {
        correct as f32 / total as f32
    }
}

fn check_dimensions(network: &Network, provider: &DataProvider) -> Result<(), DataError> {
    if network.input_dim() != provider.input_dim() {
        return Err(DataError::ShapeMismatch {
            what: "network inputs",
            expected: provider.input_dim(),
            found: network.input_dim(),
        });
    }
    if network.output_dim() != provider.num_classes() {
        return Err(DataError::ShapeMismatch {
            what: "network outputs",
            expected: provider.num_classes(),
            found: network.output_dim(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::genomics::{ActivationType, Gene, LayerGenome};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn blobs(seed: u64) -> DataProvider {
        let mut rng = StdRng::seed_from_u64(seed);
        let (train, validation) = Dataset::gaussian_blobs(40, 4, 3, 0.3, &mut rng)
            .unwrap()
            .split(0.75, &mut rng)
            .unwrap();
        DataProvider::new(train, validation, NonZeroUsize::new(8).unwrap()).unwrap()
    }

    fn network(input_dim: usize, rng: &mut StdRng) -> Network {
        let genome = LayerGenome::new(vec![Gene::new(
            NonZeroUsize::new(16).unwrap(),
            ActivationType::Tanh,
            None,
        )]);
        Network::build(&genome, input_dim, 3, rng).unwrap()
    }

    #[test]
    fn loss_decreases_on_separable_data() {
        let provider = blobs(1);
        let mut rng = StdRng::seed_from_u64(2);
        let mut network = network(4, &mut rng);
        let config = TrainingConfig {
            learning_rate: 0.01,
            epochs: NonZeroUsize::new(15).unwrap(),
            ..TrainingConfig::default()
        };
        let report = train(&mut network, &provider, &CrossEntropy, &config, &mut rng).unwrap();
        assert_eq!(report.epoch_losses.len(), 15);
        assert!(report.final_loss().unwrap() < report.epoch_losses[0]);

        let accuracy = accuracy(&network, provider.val_batches());
        assert!(accuracy > 0.8, "validation accuracy {}", accuracy);
    }

    #[test]
    fn mismatched_data_is_rejected() {
        let provider = blobs(3);
        let mut rng = StdRng::seed_from_u64(4);
        let mut network = network(5, &mut rng);
        let result = train(
            &mut network,
            &provider,
            &CrossEntropy,
            &TrainingConfig::default(),
            &mut rng,
        );
        assert!(matches!(result, Err(TrainingError::Data(_))));
    }

    #[test]
    fn divergence_is_reported() {
        let provider = blobs(5);
        let mut rng = StdRng::seed_from_u64(6);
        let mut network = network(4, &mut rng);
        let config = TrainingConfig {
            learning_rate: f32::INFINITY,
            ..TrainingConfig::default()
        };
        let result = train(&mut network, &provider, &CrossEntropy, &config, &mut rng);
        assert!(matches!(result, Err(TrainingError::Diverged { .. })));
    }

    #[test]
    fn exhausted_budget_stops_training() {
        let provider = blobs(7);
        let mut rng = StdRng::seed_from_u64(8);
        let mut network = network(4, &mut rng);
        let config = TrainingConfig {
            epochs: NonZeroUsize::new(3).unwrap(),
            time_budget_secs: Some(0),
            ..TrainingConfig::default()
        };
        let result = train(&mut network, &provider, &CrossEntropy, &config, &mut rng);
        assert!(matches!(
            result,
            Err(TrainingError::BudgetExceeded {
                epochs_completed: 1,
                ..
            })
        ));
    }

    #[test]
    fn learning_rate_must_be_positive() {
        let config = TrainingConfig {
            learning_rate: 0.0,
            ..TrainingConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidLearningRate(0.0)));
        assert_eq!(TrainingConfig::default().validate(), Ok(()));
    }
}
