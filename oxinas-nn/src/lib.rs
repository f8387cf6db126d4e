//! Feed-forward classifier architectures for the `oxinas` search.
//!
//! A [`LayerGenome`] is an ordered list of hidden-layer genes
//! (width, activation, optional dropout). Each genome is built
//! into a [`Network`], trained with Adam on softmax cross-entropy,
//! and scored by its validation accuracy through a
//! [`TrainingEvaluator`].
//!
//! # Example usage: searching classifiers for synthetic clusters
//! ```
//! use oxinas::{PopulationConfig, Search, SearchConfig};
//! use oxinas_nn::data::{DataProvider, Dataset};
//! use oxinas_nn::evaluation::TrainingEvaluator;
//! use oxinas_nn::genomics::{Blueprint, GeneticConfig, LayerGenome};
//! use oxinas_nn::training::TrainingConfig;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use std::num::NonZeroUsize;
//!
//! let mut rng = StdRng::seed_from_u64(3);
//! let (train, validation) = Dataset::gaussian_blobs(20, 4, 3, 0.3, &mut rng)
//!     .unwrap()
//!     .split(0.8, &mut rng)
//!     .unwrap();
//! let provider = DataProvider::new(train, validation, NonZeroUsize::new(8).unwrap()).unwrap();
//! let training = TrainingConfig {
//!     learning_rate: 0.01,
//!     epochs: NonZeroUsize::new(3).unwrap(),
//!     ..TrainingConfig::default()
//! };
//! let evaluator = TrainingEvaluator::new(provider, training).unwrap();
//!
//! let genetic_config = GeneticConfig {
//!     blueprint: Blueprint {
//!         max_n_layers: NonZeroUsize::new(2).unwrap(),
//!         neurons: vec![NonZeroUsize::new(8).unwrap()],
//!         ..Blueprint::default()
//!     },
//!     ..GeneticConfig::default()
//! };
//! let search_config = SearchConfig {
//!     generations: 2,
//!     seed: Some(7),
//!     ..SearchConfig::default()
//! };
//! let population_config = PopulationConfig {
//!     size: NonZeroUsize::new(4).unwrap(),
//!     num_parents: NonZeroUsize::new(2).unwrap(),
//! };
//!
//! let report =
//!     Search::<LayerGenome, _>::new(search_config, population_config, genetic_config, evaluator)
//!         .unwrap()
//!         .run()
//!         .unwrap();
//! println!("best architecture: {}", report.champion);
//! println!("retrained network: {}", report.retrained.model);
//! ```
//!
//! [`LayerGenome`]: genomics::LayerGenome
//! [`Network`]: networks::Network
//! [`TrainingEvaluator`]: evaluation::TrainingEvaluator

pub mod data;
pub mod evaluation;
pub mod genomics;
pub mod networks;
pub mod training;

mod errors;

pub use errors::ConfigError;
