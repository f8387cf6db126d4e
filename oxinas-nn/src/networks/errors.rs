use crate::genomics::ActivationType;

use thiserror::Error;

/// An error type indicating a genome could
/// not be turned into a network.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    /// The network would have no inputs or no outputs.
    #[error("cannot build a network mapping {input_dim} inputs to {output_dim} outputs")]
    ZeroWidth { input_dim: usize, output_dim: usize },
    /// A hidden layer uses an activation networks don't support.
    #[error("layer {layer} uses unsupported activation {activation}")]
    UnsupportedActivation {
        layer: usize,
        activation: ActivationType,
    },
    /// A hidden layer's dropout rate is not in (0, 1).
    #[error("layer {layer} has dropout rate {rate} outside (0, 1)")]
    InvalidDropout { layer: usize, rate: f32 },
}
