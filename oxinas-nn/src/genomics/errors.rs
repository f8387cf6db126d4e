use crate::genomics::LayerGenome;
use crate::ConfigError;

use thiserror::Error;

/// An error type indicating a failed genetic operation.
#[derive(Debug, Error)]
pub enum GenomeError {
    /// Strict crossover was attempted on genomes of different lengths.
    #[error(
        "cannot cross over genomes of different lengths: \
         {parent1} ({len1} layers) and {parent2} ({len2} layers)"
    )]
    LengthMismatch {
        parent1: String,
        len1: usize,
        parent2: String,
        len2: usize,
    },
    /// The genetic configuration cannot produce genomes.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GenomeError {
    pub(super) fn length_mismatch(parent1: &LayerGenome, parent2: &LayerGenome) -> GenomeError {
        GenomeError::LengthMismatch {
            parent1: parent1.to_string(),
            len1: parent1.len(),
            parent2: parent2.to_string(),
            len2: parent2.len(),
        }
    }
}
