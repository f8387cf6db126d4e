//! Turns a corpus into fixed-width samples: recordings are split
//! per vowel into training and validation sets, cut into Hann-windowed
//! slices, and decimated to the target sample rate.
use crate::config::DataConfig;
use crate::corpus::{Corpus, Vowel, NUM_VOWELS};

use log::{debug, info};
use ndarray::{s, Array1, Array2, ArrayView1};
use oxinas_nn::data::{DataError, DataProvider, Dataset};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use std::f32::consts::PI;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("cannot decimate {source_rate} Hz recordings to {target_rate} Hz")]
    SampleRate { source_rate: u32, target_rate: u32 },
    #[error("recording {index} has {len} samples, at least {needed} are needed")]
    TooShort { index: usize, len: usize, needed: usize },
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Returns a symmetric Hann window of `len` points,
/// zero at both ends.
pub fn hann(len: usize) -> Array1<f32> {
    if len == 1 {
        return Array1::ones(1);
    }
    let denominator = (len - 1) as f32;
    Array1::from_shape_fn(len, |i| 0.5 - 0.5 * (2.0 * PI * i as f32 / denominator).cos())
}

/// Keeps every `factor`-th sample after averaging each block
/// of `factor` samples, which suppresses aliasing. A trailing
/// partial block is dropped.
pub fn decimate(signal: ArrayView1<f32>, factor: usize) -> Array1<f32> {
    let factor = factor.max(1);
    Array1::from_shape_fn(signal.len() / factor, |i| {
        signal
            .slice(s![i * factor..(i + 1) * factor])
            .mean()
            .unwrap_or(0.0)
    })
}

/// Builds the training and validation data of a corpus.
///
/// Every training recording contributes `train_repeats` slices at
/// random offsets; every validation recording contributes the one
/// slice starting at `validation_offset`.
///
/// # Errors
/// Returns an error if the corpus' sample rate is not a multiple
/// of the target rate, if a recording is too short for its slices,
/// or if either split ends up empty.
pub fn prepare(corpus: &Corpus, config: &DataConfig) -> Result<DataProvider, PreprocessError> {
    let factor = decimation_factor(corpus.sample_rate, config.target_sample_rate)?;
    let window_size = config.window_size.get();
    let needed = config.validation_offset + window_size;
    if let Some((index, recording)) = corpus
        .recordings
        .iter()
        .enumerate()
        .find(|(_, r)| r.samples.len() < needed)
    {
        return Err(PreprocessError::TooShort {
            index,
            len: recording.samples.len(),
            needed,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.split_seed);
    let (train, validation) = stratified_split(corpus, config.train_fraction, &mut rng);
    info!(
        "split {} recordings into {} for training and {} for validation",
        corpus.len(),
        train.len(),
        validation.len()
    );

    let window = hann(window_size);
    let slices = Slicer {
        corpus,
        window: &window,
        factor,
    };
    let mut train_rows = Vec::with_capacity(train.len() * config.train_repeats.get());
    for _ in 0..config.train_repeats.get() {
        for &index in &train {
            let len = corpus.recordings[index].samples.len();
            let start = rng.gen_range(0..=len - window_size);
            train_rows.push((index, start));
        }
    }
    let validation_rows: Vec<_> = validation
        .iter()
        .map(|&index| (index, config.validation_offset))
        .collect();

    let train = slices.dataset(&train_rows)?;
    let validation = slices.dataset(&validation_rows)?;
    debug!(
        "{} training and {} validation samples of {} features",
        train.len(),
        validation.len(),
        train.input_dim()
    );
    Ok(DataProvider::new(train, validation, config.batch_size)?)
}

/// Builds a stand-in dataset of one random cluster per vowel.
pub fn synthetic(config: &DataConfig) -> Result<DataProvider, DataError> {
    let mut rng = StdRng::seed_from_u64(config.split_seed);
    let synthetic = &config.synthetic;
    let (train, validation) = Dataset::gaussian_blobs(
        synthetic.samples_per_vowel.get(),
        synthetic.input_dim.get(),
        NUM_VOWELS,
        synthetic.spread,
        &mut rng,
    )?
    .split(config.train_fraction, &mut rng)?;
    DataProvider::new(train, validation, config.batch_size)
}

fn decimation_factor(source_rate: u32, target_rate: u32) -> Result<usize, PreprocessError> {
    if target_rate == 0 || target_rate > source_rate || source_rate % target_rate != 0 {
        return Err(PreprocessError::SampleRate {
            source_rate,
            target_rate,
        });
    }
    Ok((source_rate / target_rate) as usize)
}

/// Returns the indices of the training and validation recordings,
/// taking `fraction` of every vowel's recordings for training.
fn stratified_split<R: Rng + ?Sized>(
    corpus: &Corpus,
    fraction: f32,
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let mut train = Vec::new();
    let mut validation = Vec::new();
    for vowel in Vowel::ALL {
        let mut members: Vec<usize> = (0..corpus.len())
            .filter(|i| corpus.recordings[*i].vowel == vowel)
            .collect();
        members.shuffle(rng);
        let cut = ((members.len() as f32 * fraction).round() as usize).min(members.len());
        train.extend_from_slice(&members[..cut]);
        validation.extend_from_slice(&members[cut..]);
    }
    (train, validation)
}

struct Slicer<'a> {
    corpus: &'a Corpus,
    window: &'a Array1<f32>,
    factor: usize,
}

impl Slicer<'_> {
    fn features(&self, index: usize, start: usize) -> Array1<f32> {
        let samples = &self.corpus.recordings[index].samples[start..start + self.window.len()];
        let windowed = &ArrayView1::from(samples) * self.window;
        decimate(windowed.view(), self.factor)
    }

    /// Slices every `(recording, start)` pair into one labelled row.
    fn dataset(&self, rows: &[(usize, usize)]) -> Result<Dataset, DataError> {
        let width = self.window.len() / self.factor;
        let mut features = Array2::zeros((rows.len(), width));
        let mut labels = Vec::with_capacity(rows.len());
        for (mut row, &(index, start)) in features.rows_mut().into_iter().zip(rows) {
            row.assign(&self.features(index, start));
            labels.push(self.corpus.recordings[index].vowel.index());
        }
        Dataset::from_labels(features, &labels, NUM_VOWELS)
    }
}
