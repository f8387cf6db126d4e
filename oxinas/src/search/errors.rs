use crate::artifacts::ArtifactError;
use crate::{ConfigError, PopulationError};

use rayon::ThreadPoolBuildError;
use thiserror::Error;

use std::error::Error;

/// An error type indicating a failed search run.
///
/// Errors raised after the search has started carry
/// a description of the champion found so far.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid genetic configuration: {source}")]
    GeneticConfig { source: Box<dyn Error + Send + Sync> },
    #[error("failed to start evaluation workers: {0}")]
    Workers(#[from] ThreadPoolBuildError),
    #[error(
        "generation {generation}: evaluation of genome {genome} ({description}) failed: \
         {source}; champion so far: {}",
        .champion.as_deref().unwrap_or("none")
    )]
    Evaluation {
        generation: usize,
        genome: usize,
        description: String,
        champion: Option<String>,
        source: Box<dyn Error + Send + Sync>,
    },
    #[error(
        "generation {generation}: {source}; champion so far: {}",
        .champion.as_deref().unwrap_or("none")
    )]
    Population {
        generation: usize,
        champion: Option<String>,
        source: PopulationError,
    },
    #[error("no genome was scored")]
    NoChampion,
    #[error("retraining of champion {champion} failed: {source}")]
    Retrain {
        champion: String,
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("failed to persist the retrained champion: {0}")]
    Artifact(#[from] ArtifactError),
}
