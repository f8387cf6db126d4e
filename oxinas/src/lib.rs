//! A genetic-algorithm neural architecture search.
//!
//! Candidate architectures are encoded as genomes (any type implementing
//! the [`Genome`] trait) and scored by an [`Evaluator`], typically by
//! training the encoded model and measuring its validation accuracy.
//! A [`Search`] runs a fixed number of generations of truncation
//! selection and elitist breeding, tracks the best genome found over
//! the whole run, and retrains it once the run is over.
//!
//! A layer-structured feed-forward genome, with network building and
//! training, is supplied by the `oxinas-nn` crate.
//!
//! # Example usage: maximizing the number of set bits
//! ```
//! use oxinas::{Evaluator, Genome, PopulationConfig, Retrained, Search, SearchConfig};
//! use rand::Rng;
//! use std::convert::Infallible;
//! use std::fmt;
//! use std::num::NonZeroUsize;
//!
//! #[derive(Clone, Debug)]
//! struct Bits(Vec<bool>);
//!
//! impl fmt::Display for Bits {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         for bit in &self.0 {
//!             write!(f, "{}", *bit as u8)?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl Genome for Bits {
//!     type Config = usize;
//!     type Error = Infallible;
//!
//!     fn validate_config(_: &usize) -> Result<(), Infallible> {
//!         Ok(())
//!     }
//!
//!     fn random<R: Rng + ?Sized>(len: &usize, rng: &mut R) -> Result<Bits, Infallible> {
//!         Ok(Bits((0..*len).map(|_| rng.gen()).collect()))
//!     }
//!
//!     fn mate<R: Rng + ?Sized>(
//!         a: &Bits,
//!         b: &Bits,
//!         _: &usize,
//!         rng: &mut R,
//!     ) -> Result<Bits, Infallible> {
//!         let bits = a.0.iter().zip(&b.0).map(|(x, y)| if rng.gen() { *x } else { *y });
//!         Ok(Bits(bits.collect()))
//!     }
//!
//!     fn mutate<R: Rng + ?Sized>(&self, _: &usize, rng: &mut R) -> Result<Bits, Infallible> {
//!         Ok(Bits(self.0.iter().map(|b| if rng.gen_bool(0.1) { !b } else { *b }).collect()))
//!     }
//!
//!     fn size(&self) -> usize {
//!         self.0.len()
//!     }
//! }
//!
//! struct CountOnes;
//!
//! impl Evaluator<Bits> for CountOnes {
//!     type Model = usize;
//!     type Error = Infallible;
//!
//!     fn evaluate(&self, genome: &Bits, _seed: u64) -> Result<f32, Infallible> {
//!         Ok(genome.0.iter().filter(|b| **b).count() as f32 / genome.0.len() as f32)
//!     }
//!
//!     fn retrain(&self, genome: &Bits, seed: u64) -> Result<Retrained<usize>, Infallible> {
//!         Ok(Retrained {
//!             model: genome.0.iter().filter(|b| **b).count(),
//!             accuracy: self.evaluate(genome, seed)?,
//!         })
//!     }
//! }
//!
//! let search_config = SearchConfig {
//!     generations: 10,
//!     seed: Some(42),
//!     ..SearchConfig::default()
//! };
//! let population_config = PopulationConfig {
//!     size: NonZeroUsize::new(30).unwrap(),
//!     num_parents: NonZeroUsize::new(6).unwrap(),
//! };
//!
//! let report = Search::<Bits, _>::new(search_config, population_config, 16, CountOnes)
//!     .unwrap()
//!     .run()
//!     .unwrap();
//! println!("best genome: {}", report.champion);
//! assert_eq!(report.logs.len(), 10);
//! assert!(report.champion.fitness() >= report.logs[0].fitness.maximum);
//! ```

pub mod artifacts;
mod evaluation;
mod genome;
mod populations;
mod search;

#[cfg(test)]
mod testing;

pub use evaluation::{EvaluationPool, Evaluator, Retrained};
pub use genome::Genome;
pub use populations::*;
pub use search::{Champion, Search, SearchConfig, SearchError, SearchReport, FAILED_FITNESS};
