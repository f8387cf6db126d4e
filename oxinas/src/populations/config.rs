use super::ConfigError;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

const fn non_zero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("population counts must be non-zero"),
    }
}

/// Configuration data for population generation
/// and evolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Top n of the population which is copied
    /// as-is to the next generation, and from
    /// which all offspring are bred.
    pub num_parents: NonZeroUsize,
}

impl PopulationConfig {
    /// Checks that the configuration describes
    /// a population that can be evolved.
    ///
    /// # Examples
    /// ```
    /// use oxinas::PopulationConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = PopulationConfig {
    ///     size: NonZeroUsize::new(4).unwrap(),
    ///     num_parents: NonZeroUsize::new(5).unwrap(),
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_parents > self.size {
            return Err(ConfigError::TooManyParents {
                num_parents: self.num_parents.get(),
                size: self.size.get(),
            });
        }
        Ok(())
    }
}

impl Default for PopulationConfig {
    fn default() -> PopulationConfig {
        PopulationConfig {
            size: non_zero(20),
            num_parents: non_zero(5),
        }
    }
}
