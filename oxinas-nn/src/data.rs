//! Labelled datasets and the provider handing
//! them out in batches for training and validation.
use ndarray::{Array2, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use std::num::NonZeroUsize;

/// An error type indicating unusable data.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    /// A dataset has no samples or no features.
    #[error("the {0} dataset is empty")]
    Empty(&'static str),
    /// Two widths that must agree don't.
    #[error("{what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A target row is not a one-hot vector.
    #[error("target row {row} is not one-hot")]
    NotOneHot { row: usize },
    /// A label is out of range for the number of classes.
    #[error("label {label} of sample {row} is not below {num_classes}")]
    InvalidLabel {
        row: usize,
        label: usize,
        num_classes: usize,
    },
    /// A feature value is NaN or infinite.
    #[error("sample {row} has a non-finite feature")]
    NonFinite { row: usize },
}

/// Row-major features (`N × D`) with one-hot targets (`N × K`).
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    features: Array2<f32>,
    targets: Array2<f32>,
}

impl Dataset {
    /// Creates a dataset, checking that it is non-empty,
    /// that features are finite, and that every target
    /// row is one-hot.
    pub fn new(features: Array2<f32>, targets: Array2<f32>) -> Result<Dataset, DataError> {
        if features.nrows() == 0 || features.ncols() == 0 || targets.ncols() == 0 {
            return Err(DataError::Empty("labelled"));
        }
        if features.nrows() != targets.nrows() {
            return Err(DataError::ShapeMismatch {
                what: "target rows",
                expected: features.nrows(),
                found: targets.nrows(),
            });
        }
        for (row, sample) in features.axis_iter(Axis(0)).enumerate() {
            if !sample.iter().all(|x| x.is_finite()) {
                return Err(DataError::NonFinite { row });
            }
        }
        for (row, target) in targets.axis_iter(Axis(0)).enumerate() {
            let ones = target.iter().filter(|t| **t == 1.0).count();
            let zeros = target.iter().filter(|t| **t == 0.0).count();
            if ones != 1 || ones + zeros != target.len() {
                return Err(DataError::NotOneHot { row });
            }
        }
        Ok(Dataset { features, targets })
    }

    /// Creates a dataset from class indices, one-hot
    /// encoding them over `num_classes` classes.
    ///
    /// # Examples
    /// ```
    /// use ndarray::array;
    /// use oxinas_nn::data::Dataset;
    ///
    /// let dataset = Dataset::from_labels(array![[0.5f32], [1.5], [2.5]], &[2, 0, 1], 3).unwrap();
    /// assert_eq!(dataset.targets(), array![[0.0f32, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    /// assert_eq!(dataset.labels(), [2, 0, 1]);
    /// ```
    pub fn from_labels(
        features: Array2<f32>,
        labels: &[usize],
        num_classes: usize,
    ) -> Result<Dataset, DataError> {
        if let Some((row, label)) = labels.iter().enumerate().find(|(_, l)| **l >= num_classes) {
            return Err(DataError::InvalidLabel {
                row,
                label: *label,
                num_classes,
            });
        }
        let targets = Array2::from_shape_fn((labels.len(), num_classes), |(i, j)| {
            if labels[i] == j {
                1.0
            } else {
                0.0
            }
        });
        Dataset::new(features, targets)
    }

    /// Returns `num_classes` clusters of `per_class` samples each,
    /// scattered uniformly within `spread` of a random center.
    pub fn gaussian_blobs<R: Rng + ?Sized>(
        per_class: usize,
        input_dim: usize,
        num_classes: usize,
        spread: f32,
        rng: &mut R,
    ) -> Result<Dataset, DataError> {
        let centers =
            Array2::from_shape_fn((num_classes, input_dim), |_| rng.gen_range(-2.0f32..=2.0));
        let labels: Vec<usize> = (0..num_classes)
            .flat_map(|class| std::iter::repeat(class).take(per_class))
            .collect();
        let features = Array2::from_shape_fn((labels.len(), input_dim), |(i, j)| {
            centers[[labels[i], j]] + spread * (rng.gen::<f32>() * 2.0 - 1.0)
        });
        Dataset::from_labels(features, &labels, num_classes)
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn input_dim(&self) -> usize {
        self.features.ncols()
    }

    pub fn num_classes(&self) -> usize {
        self.targets.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    pub fn targets(&self) -> ArrayView2<'_, f32> {
        self.targets.view()
    }

    /// Returns the class index of every sample.
    pub fn labels(&self) -> Vec<usize> {
        crate::networks::argmax_rows(&self.targets)
    }

    /// Splits the dataset in two, stratified by class: a
    /// `fraction` of every class's samples (rounded) goes
    /// to the first part, chosen at random.
    ///
    /// # Errors
    /// Returns an error if either part would be empty.
    pub fn split<R: Rng + ?Sized>(
        &self,
        fraction: f32,
        rng: &mut R,
    ) -> Result<(Dataset, Dataset), DataError> {
        let labels = self.labels();
        let mut first = Vec::new();
        let mut second = Vec::new();
        for class in 0..self.num_classes() {
            let mut members: Vec<usize> =
                (0..labels.len()).filter(|i| labels[*i] == class).collect();
            members.shuffle(rng);
            let cut = ((members.len() as f32 * fraction).round() as usize).min(members.len());
            first.extend_from_slice(&members[..cut]);
            second.extend_from_slice(&members[cut..]);
        }
        Ok((self.subset(&first)?, self.subset(&second)?))
    }

    fn subset(&self, indices: &[usize]) -> Result<Dataset, DataError> {
        Dataset::new(
            self.features.select(Axis(0), indices),
            self.targets.select(Axis(0), indices),
        )
    }

    fn batch(&self, indices: &[usize]) -> Batch {
        Batch {
            features: self.features.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
        }
    }
}

/// A slice of a dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub features: Array2<f32>,
    pub targets: Array2<f32>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A lazy sequence of batches over a dataset.
/// The last batch may be smaller than the rest.
pub struct Batches<'a> {
    dataset: &'a Dataset,
    order: Vec<usize>,
    batch_size: usize,
    position: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.position >= self.order.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.order.len());
        let batch = self.dataset.batch(&self.order[self.position..end]);
        self.position = end;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.order.len() - self.position;
        let batches = (remaining + self.batch_size - 1) / self.batch_size;
        (batches, Some(batches))
    }
}

impl ExactSizeIterator for Batches<'_> {}

/// Holds the training and validation datasets.
///
/// Evaluations only read the provider, so one provider
/// can be shared by every evaluator thread.
#[derive(Clone, Debug)]
pub struct DataProvider {
    train: Dataset,
    validation: Dataset,
    batch_size: NonZeroUsize,
}

impl DataProvider {
    /// # Errors
    /// Returns an error if the datasets disagree on
    /// the number of features or classes.
    pub fn new(
        train: Dataset,
        validation: Dataset,
        batch_size: NonZeroUsize,
    ) -> Result<DataProvider, DataError> {
        if train.input_dim() != validation.input_dim() {
            return Err(DataError::ShapeMismatch {
                what: "validation features",
                expected: train.input_dim(),
                found: validation.input_dim(),
            });
        }
        if train.num_classes() != validation.num_classes() {
            return Err(DataError::ShapeMismatch {
                what: "validation classes",
                expected: train.num_classes(),
                found: validation.num_classes(),
            });
        }
        Ok(DataProvider {
            train,
            validation,
            batch_size,
        })
    }

    /// Returns the training batches in a fresh random order.
    pub fn train_batches<R: Rng + ?Sized>(&self, rng: &mut R) -> Batches<'_> {
        let mut order: Vec<usize> = (0..self.train.len()).collect();
        order.shuffle(rng);
        self.batches(&self.train, order)
    }

    /// Returns the validation batches, always in the same order.
    pub fn val_batches(&self) -> Batches<'_> {
        self.batches(&self.validation, (0..self.validation.len()).collect())
    }

    fn batches<'a>(&self, dataset: &'a Dataset, order: Vec<usize>) -> Batches<'a> {
        Batches {
            dataset,
            order,
            batch_size: self.batch_size.get(),
            position: 0,
        }
    }

    /// Returns the number of features (D).
    pub fn input_dim(&self) -> usize {
        self.train.input_dim()
    }

    /// Returns the number of classes (K).
    pub fn num_classes(&self) -> usize {
        self.train.num_classes()
    }

    pub fn train(&self) -> &Dataset {
        &self.train
    }

    pub fn validation(&self) -> &Dataset {
        &self.validation
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }
}
