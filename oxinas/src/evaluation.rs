//! Fitness evaluation. An [`Evaluator`] scores single genomes;
//! an [`EvaluationPool`] scores a whole generation, either one
//! genome at a time or on a fixed-size pool of worker threads.
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use std::error::Error;
use std::num::NonZeroUsize;

/// A model trained from a genome, with its validation accuracy.
#[derive(Clone, Debug)]
pub struct Retrained<M> {
    pub model: M,
    pub accuracy: f32,
}

/// An interface for scoring genomes.
///
/// Evaluations must be independent of each other: the evaluator
/// is shared between worker threads and may only read its own state.
pub trait Evaluator<G>: Sync {
    type Model;
    type Error: Error + Send + Sync + 'static;

    /// Returns the fitness of `genome`, in `[0, 1]`.
    ///
    /// All randomness must be derived from `seed`, so that
    /// evaluations don't depend on scheduling order.
    fn evaluate(&self, genome: &G, seed: u64) -> Result<f32, Self::Error>;

    /// Trains a final model from `genome` and returns it
    /// with its validation accuracy.
    fn retrain(&self, genome: &G, seed: u64) -> Result<Retrained<Self::Model>, Self::Error>;

    /// Returns whether `error` should abort the whole search,
    /// as opposed to only disqualifying the genome that caused it.
    fn is_fatal(&self, _error: &Self::Error) -> bool {
        false
    }
}

/// Evaluates generations, sequentially or in parallel.
pub struct EvaluationPool {
    workers: Option<ThreadPool>,
}

impl EvaluationPool {
    /// Returns a pool that evaluates genomes one at a time
    /// on the calling thread.
    pub fn sequential() -> EvaluationPool {
        EvaluationPool { workers: None }
    }

    /// Returns a pool of `workers` evaluator threads.
    ///
    /// # Errors
    /// Returns an error if the threads could not be spawned.
    pub fn with_workers(workers: NonZeroUsize) -> Result<EvaluationPool, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|i| format!("oxinas-evaluator-{}", i))
            .build()?;
        Ok(EvaluationPool {
            workers: Some(pool),
        })
    }

    /// Returns the number of evaluations that can run at once.
    pub fn concurrency(&self) -> usize {
        self.workers
            .as_ref()
            .map_or(1, |pool| pool.current_num_threads())
    }

    /// Evaluates every genome with its paired seed, returning
    /// the results in population order.
    ///
    /// # Panics
    /// Panics if `genomes` and `seeds` differ in length.
    pub fn evaluate_all<G, E>(
        &self,
        evaluator: &E,
        genomes: &[G],
        seeds: &[u64],
    ) -> Vec<Result<f32, E::Error>>
    where
        G: Sync,
        E: Evaluator<G>,
    {
        assert_eq!(genomes.len(), seeds.len(), "one seed is needed per genome");
        match &self.workers {
            None => genomes
                .iter()
                .zip(seeds)
                .map(|(genome, seed)| evaluator.evaluate(genome, *seed))
                .collect(),
            Some(pool) => pool.install(|| {
                genomes
                    .par_iter()
                    .zip(seeds.par_iter())
                    .map(|(genome, seed)| evaluator.evaluate(genome, *seed))
                    .collect()
            }),
        }
    }
}
