//! Persistence of trained models. Artifacts are stored
//! as pretty-printed RON files named after their key.
use ron::ser::PrettyConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Key under which the search stores the retrained champion.
pub const BEST_MODEL_KEY: &str = "best model parameters";

/// An error type indicating an artifact
/// could not be written or read back.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact i/o failed for {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to parse artifact: {0}")]
    Deserialize(#[from] ron::error::SpannedError),
}

/// A directory of named artifacts.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    directory: PathBuf,
}

impl ArtifactStore {
    pub fn new(directory: impl Into<PathBuf>) -> ArtifactStore {
        ArtifactStore {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the file an artifact is stored in.
    ///
    /// # Examples
    /// ```
    /// use oxinas::artifacts::{ArtifactStore, BEST_MODEL_KEY};
    /// use std::path::Path;
    ///
    /// let store = ArtifactStore::new("out");
    /// assert_eq!(
    ///     store.path_for(BEST_MODEL_KEY),
    ///     Path::new("out/best_model_parameters.ron")
    /// );
    /// ```
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory
            .join(format!("{}.ron", key.trim().replace(' ', "_")))
    }

    /// Writes `artifact` under `key`, creating the store's
    /// directory if needed, and returns the file written.
    pub fn store<T: Serialize>(&self, key: &str, artifact: &T) -> Result<PathBuf, ArtifactError> {
        let path = self.path_for(key);
        let text = ron::ser::to_string_pretty(artifact, PrettyConfig::new())?;
        fs::create_dir_all(&self.directory).map_err(|source| ArtifactError::Io {
            path: self.directory.clone(),
            source,
        })?;
        fs::write(&path, text).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Reads back the artifact stored under `key`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<T, ArtifactError> {
        let path = self.path_for(key);
        let text = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(ron::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    #[test]
    fn store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested"));
        let mut artifact = BTreeMap::new();
        artifact.insert("weights".to_string(), vec![0.25f32, -1.5, 3.0]);

        let path = store.store(BEST_MODEL_KEY, &artifact).unwrap();
        assert!(path.ends_with("best_model_parameters.ron"));
        let loaded: BTreeMap<String, Vec<f32>> = store.load(BEST_MODEL_KEY).unwrap();
        assert_eq!(loaded, artifact);
    }

    #[test]
    fn missing_artifact_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let result: Result<Vec<f32>, _> = store.load("absent");
        assert!(matches!(result, Err(ArtifactError::Io { .. })));
    }
}
