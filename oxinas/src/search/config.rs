use crate::logging::ReportingLevel;
use crate::ConfigError;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Configuration of a search run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of generations to evaluate.
    pub generations: usize,
    /// Seed for every random decision of the run.
    /// A random seed is drawn if absent.
    pub seed: Option<u64>,
    /// Number of evaluator threads. Genomes are
    /// evaluated one at a time if absent.
    pub workers: Option<NonZeroUsize>,
    /// Amount of genomes kept in each generation's log.
    pub reporting_level: ReportingLevel,
    /// Directory the retrained champion is written to.
    /// Nothing is persisted if absent.
    pub artifact_dir: Option<PathBuf>,
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> SearchConfig {
        SearchConfig {
            generations: 4,
            seed: None,
            workers: None,
            reporting_level: ReportingLevel::default(),
            artifact_dir: None,
        }
    }
}
