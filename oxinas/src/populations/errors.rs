use std::error::Error;

use thiserror::Error;

/// An error type indicating an unusable
/// population or search configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// More parents requested than individuals exist.
    #[error("num_parents ({num_parents}) exceeds the population size ({size})")]
    TooManyParents { num_parents: usize, size: usize },
    /// The search was configured to run no generations.
    #[error("the search must run at least one generation")]
    NoGenerations,
}

/// An error type indicating a structural failure
/// during selection or breeding.
#[derive(Debug, Error)]
pub enum PopulationError {
    /// Fitness values don't line up with the population.
    #[error("{fitnesses} fitness values supplied for a population of {population}")]
    FitnessCountMismatch { population: usize, fitnesses: usize },
    /// Selection asked for more parents than are available.
    #[error("cannot select {requested} parents from {available} individuals")]
    NotEnoughIndividuals { requested: usize, available: usize },
    /// A fitness value could not be ranked.
    #[error("genome {index} has an unrankable fitness value ({fitness})")]
    InvalidFitness { index: usize, fitness: f32 },
    /// Breeding was attempted without any parents.
    #[error("attempted breeding with an empty parent pool")]
    NoParents,
    /// Two parents could not be mated.
    #[error("failed to mate {parent1} with {parent2}: {source}")]
    Mating {
        parent1: String,
        parent2: String,
        source: Box<dyn Error + Send + Sync>,
    },
    /// A child could not be mutated.
    #[error("failed to mutate {genome}: {source}")]
    Mutation {
        genome: String,
        source: Box<dyn Error + Send + Sync>,
    },
}
