//! A Population is a fixed-size collection of genomes,
//! evolved one generation at a time by truncation
//! selection and elitist breeding, using externally
//! computed fitness values as the source of selective
//! pressure.
mod config;
mod errors;
pub mod logging;
mod offspring_factory;

use crate::Genome;
pub use config::PopulationConfig;
pub use errors::{ConfigError, PopulationError};
use offspring_factory::OffspringFactory;

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::cmp::Ordering;

/// A population of genomes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Population<C, G> {
    genomes: Vec<G>,
    generation: usize,
    population_config: PopulationConfig,
    genetic_config: C,
}

impl<C, G> Population<C, G>
where
    G: Genome<Config = C>,
{
    /// Creates a new population of randomly generated
    /// genomes using the passed configurations.
    ///
    /// The type of `genetic_config` depends on the implementation
    /// of [`Genome`], and is effectively opaque to the population.
    ///
    /// # Errors
    /// Returns the genome's error if a random genome
    /// could not be generated from `genetic_config`.
    ///
    /// [`Genome`]: crate::Genome
    pub fn new<R: Rng + ?Sized>(
        population_config: PopulationConfig,
        genetic_config: C,
        rng: &mut R,
    ) -> Result<Population<C, G>, G::Error> {
        let genomes = (0..population_config.size.get())
            .map(|_| G::random(&genetic_config, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Population {
            genomes,
            generation: 0,
            population_config,
            genetic_config,
        })
    }

    /// Creates a population from the specified genomes.
    ///
    /// Returns `None` if the number of genomes differs
    /// from the configured population size.
    pub fn new_seeded(
        genomes: Vec<G>,
        population_config: PopulationConfig,
        genetic_config: C,
    ) -> Option<Population<C, G>> {
        if genomes.len() != population_config.size.get() {
            return None;
        }
        Some(Population {
            genomes,
            generation: 0,
            population_config,
            genetic_config,
        })
    }

    /// Selects the parents of the next generation
    /// by [truncation selection].
    ///
    /// `fitnesses` must be aligned with the population's
    /// genomes, as returned by [`Population::genomes`].
    ///
    /// [truncation selection]: select
    pub fn select(&self, fitnesses: &[f32]) -> Result<Vec<G>, PopulationError> {
        select(
            &self.genomes,
            fitnesses,
            self.population_config.num_parents.get(),
        )
    }

    /// Replaces the population with the next generation:
    /// the passed parents, kept as-is, followed by as many
    /// mutated children of theirs as needed to restore the
    /// population size.
    pub fn breed<R: Rng + ?Sized>(
        &mut self,
        parents: Vec<G>,
        rng: &mut R,
    ) -> Result<(), PopulationError> {
        let offspring_count = self
            .population_config
            .size
            .get()
            .saturating_sub(parents.len());
        let offspring = OffspringFactory::new(&parents, &self.genetic_config)
            .generate_offspring(offspring_count, rng)?;

        self.genomes = parents;
        self.genomes.extend(offspring);
        self.generation += 1;
        Ok(())
    }

    /// Evolves the population by selecting the best
    /// performing genomes and breeding the next generation
    /// from them.
    ///
    /// # Errors
    /// Returns an error if the fitnesses don't match the
    /// population, or if parents could not be mated.
    pub fn evolve<R: Rng + ?Sized>(
        &mut self,
        fitnesses: &[f32],
        rng: &mut R,
    ) -> Result<(), PopulationError> {
        let parents = self.select(fitnesses)?;
        self.breed(parents, rng)
    }

    /// Returns an iterator over all current genomes.
    pub fn genomes(&self) -> impl Iterator<Item = &G> {
        self.genomes.iter()
    }

    /// Returns the current genomes as a slice.
    pub fn as_slice(&self) -> &[G] {
        &self.genomes
    }

    /// Returns the number of genomes in the population.
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Returns `true` if the population holds no genomes.
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the population's configuration.
    pub fn population_config(&self) -> &PopulationConfig {
        &self.population_config
    }

    /// Returns the population's genetic configuration.
    pub fn genetic_config(&self) -> &C {
        &self.genetic_config
    }
}

/// Truncation selection: returns the `num_parents`
/// individuals with the highest fitness, best first.
///
/// Sorting is stable, so the population order is
/// preserved among equal fitnesses.
///
/// # Errors
/// Returns an error if `fitnesses` is not aligned with
/// `population`, if there are fewer than `num_parents`
/// individuals, or if a fitness is NaN.
///
/// # Examples
/// ```
/// use oxinas::select;
///
/// let population = ["a", "b", "c", "d"];
/// let fitnesses = [0.2, 0.9, 0.5, 0.9];
///
/// let parents = select(&population, &fitnesses, 3).unwrap();
/// assert_eq!(parents, ["b", "d", "c"]);
/// ```
pub fn select<G: Clone>(
    population: &[G],
    fitnesses: &[f32],
    num_parents: usize,
) -> Result<Vec<G>, PopulationError> {
    if population.len() != fitnesses.len() {
        return Err(PopulationError::FitnessCountMismatch {
            population: population.len(),
            fitnesses: fitnesses.len(),
        });
    }
    if num_parents > population.len() {
        return Err(PopulationError::NotEnoughIndividuals {
            requested: num_parents,
            available: population.len(),
        });
    }
    if let Some((index, &fitness)) = fitnesses.iter().enumerate().find(|(_, f)| f.is_nan()) {
        return Err(PopulationError::InvalidFitness { index, fitness });
    }

    let mut ranking: Vec<usize> = (0..population.len()).collect();
    ranking.sort_by(|&a, &b| {
        fitnesses[b]
            .partial_cmp(&fitnesses[a])
            .unwrap_or(Ordering::Equal)
    });
    Ok(ranking
        .into_iter()
        .take(num_parents)
        .map(|i| population[i].clone())
        .collect())
}
