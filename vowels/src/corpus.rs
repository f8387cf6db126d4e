//! Recordings of spoken vowels, stored as RON:
//!
//! ```text
//! (
//!     sample_rate: 48000,
//!     recordings: [
//!         (vowel: a, samples: [0.0, 0.01, ...]),
//!     ],
//! )
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Number of vowel classes.
pub const NUM_VOWELS: usize = 6;

/// The six vowels, in class-index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vowel {
    A,
    E,
    O,
    Aa,
    I,
    U,
}

impl Vowel {
    pub const ALL: [Vowel; NUM_VOWELS] =
        [Vowel::A, Vowel::E, Vowel::O, Vowel::Aa, Vowel::I, Vowel::U];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Vowel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Vowel::A => "a",
            Vowel::E => "e",
            Vowel::O => "o",
            Vowel::Aa => "aa",
            Vowel::I => "i",
            Vowel::U => "u",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse corpus: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("corpus holds no recordings")]
    Empty,
    #[error("corpus sample rate must be positive")]
    SampleRate,
    #[error("recording {index} contains a non-finite sample")]
    NonFinite { index: usize },
}

/// A single utterance of a vowel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub vowel: Vowel,
    pub samples: Vec<f32>,
}

/// A collection of recordings sharing one sample rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub sample_rate: u32,
    pub recordings: Vec<Recording>,
}

impl Corpus {
    pub fn load(path: &Path) -> Result<Corpus, CorpusError> {
        let text = fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    /// Returns the number of recordings of every vowel,
    /// in class-index order.
    pub fn counts(&self) -> [usize; NUM_VOWELS] {
        let mut counts = [0; NUM_VOWELS];
        for recording in &self.recordings {
            counts[recording.vowel.index()] += 1;
        }
        counts
    }

    fn validate(&self) -> Result<(), CorpusError> {
        if self.is_empty() {
            return Err(CorpusError::Empty);
        }
        if self.sample_rate == 0 {
            return Err(CorpusError::SampleRate);
        }
        if let Some(index) = self
            .recordings
            .iter()
            .position(|r| !r.samples.iter().all(|s| s.is_finite()))
        {
            return Err(CorpusError::NonFinite { index });
        }
        Ok(())
    }
}

impl std::str::FromStr for Corpus {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Corpus, CorpusError> {
        let corpus: Corpus = ron::from_str(s)?;
        corpus.validate()?;
        Ok(corpus)
    }
}
