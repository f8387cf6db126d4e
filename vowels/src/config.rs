use oxinas::{PopulationConfig, SearchConfig};
use oxinas_nn::genomics::GeneticConfig;
use oxinas_nn::training::TrainingConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const fn non_zero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("data counts must be non-zero"),
    }
}

/// An error type indicating an unusable run configuration.
#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse run configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("train fraction {0} is outside (0, 1)")]
    TrainFraction(f32),
    #[error("target sample rate must be positive")]
    SampleRate,
}

/// Everything a run needs, as read from a RON file.
/// Absent sections and fields take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub search: SearchConfig,
    pub population: PopulationConfig,
    pub genetic: GeneticConfig,
    pub training: TrainingConfig,
    pub data: DataConfig,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<RunConfig, RunConfigError> {
        let text = fs::read_to_string(path).map_err(|source| RunConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig = ron::from_str(&text)?;
        config.data.validate()?;
        Ok(config)
    }
}

/// How recordings are turned into training and validation samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub batch_size: NonZeroUsize,
    /// Share of each vowel's recordings used for training.
    pub train_fraction: f32,
    /// Seed of the train/validation split and of the
    /// training slices, independent of the search seed.
    pub split_seed: u64,
    /// Number of random slices taken from every training recording.
    pub train_repeats: NonZeroUsize,
    /// Length of a slice, in samples at the corpus' rate.
    pub window_size: NonZeroUsize,
    /// Start of the single slice taken from every validation recording.
    pub validation_offset: usize,
    /// Rate slices are decimated to. Must divide the corpus' rate.
    pub target_sample_rate: u32,
    /// Replaces the corpus when running with `--synthetic`.
    pub synthetic: SyntheticConfig,
}

impl DataConfig {
    pub fn validate(&self) -> Result<(), RunConfigError> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(RunConfigError::TrainFraction(self.train_fraction));
        }
        if self.target_sample_rate == 0 {
            return Err(RunConfigError::SampleRate);
        }
        Ok(())
    }
}

impl Default for DataConfig {
    fn default() -> DataConfig {
        DataConfig {
            batch_size: non_zero(16),
            train_fraction: 0.8,
            split_seed: 42,
            train_repeats: non_zero(10),
            window_size: non_zero(10_000),
            validation_offset: 5_000,
            target_sample_rate: 16_000,
            synthetic: SyntheticConfig::default(),
        }
    }
}

/// Shape of the synthetic stand-in dataset: one cluster per vowel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub samples_per_vowel: NonZeroUsize,
    pub input_dim: NonZeroUsize,
    pub spread: f32,
}

impl Default for SyntheticConfig {
    fn default() -> SyntheticConfig {
        SyntheticConfig {
            samples_per_vowel: non_zero(50),
            input_dim: non_zero(32),
            spread: 0.5,
        }
    }
}
