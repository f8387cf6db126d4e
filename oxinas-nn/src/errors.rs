use crate::genomics::ActivationType;

use thiserror::Error;

/// An error type indicating an unusable genetic
/// or training configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A candidate list the genome draws from is empty.
    #[error("the {0} candidate list is empty")]
    EmptyCandidates(&'static str),
    /// A dropout candidate is not in (0, 1).
    #[error("dropout rate {rate} in the {list} candidate list is outside (0, 1)")]
    InvalidDropout { rate: f32, list: &'static str },
    /// An activation that cannot be built appears where it is not allowed.
    #[error("activation {activation} is not allowed in the {list} candidate list")]
    UnsupportedActivation {
        activation: ActivationType,
        list: &'static str,
    },
    /// The mutation rate is not a probability.
    #[error("mutation rate {0} is outside [0, 1]")]
    InvalidMutationRate(f32),
    /// The learning rate is not a positive finite number.
    #[error("learning rate {0} must be positive and finite")]
    InvalidLearningRate(f32),
    /// An activation name did not match any known activation.
    #[error("unknown activation {0:?}")]
    UnknownActivation(String),
}
