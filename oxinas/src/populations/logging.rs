use super::Population;

use crate::genome::Genome;

use serde::{Deserialize, Serialize};

use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingLevel {
    /// Clones the entire population with its fitnesses.
    AllGenomes,
    /// Clones only the generation's best genome.
    GenerationChampion,
    /// Clones no genomes.
    NoGenomes,
}

impl Default for ReportingLevel {
    fn default() -> ReportingLevel {
        ReportingLevel::NoGenomes
    }
}

/// A snapshot of an evaluated generation.
#[derive(Clone, Debug)]
pub struct Log<G> {
    pub generation_number: usize,
    pub generation_sample: GenerationMemberRecord<G>,
    pub fitness: Stats,
    pub genome_size: Stats,
    pub failed_evaluations: usize,
    pub champion_fitness: f32,
}

impl<G> fmt::Display for Log<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Log {{\n\
            \tgeneration_number: {:?}\n\
            \tfitness: {:?}\n\
            \tgenome_size: {:?}\n\
            \tfailed_evaluations: {:?}\n\
            \tchampion_fitness: {:?}\n\
            }}",
            &self.generation_number,
            &self.fitness,
            &self.genome_size,
            &self.failed_evaluations,
            &self.champion_fitness,
        )
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// All values are NaN for an empty sequence.
    ///
    /// # Examples
    /// ```
    /// use oxinas::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Stats {
        let mut data: Vec<f32> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: f32::NAN,
                minimum: f32::NAN,
                mean: f32::NAN,
                median: f32::NAN,
            };
        }
        data.sort_by(f32::total_cmp);
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f32>() / data.len() as f32,
            median,
        }
    }
}

/// A reporting-level dependant store
/// of genomes from a generation.
#[derive(Clone, Debug)]
pub enum GenerationMemberRecord<G> {
    /// Every genome with its fitness, in population order.
    All(Vec<(G, f32)>),
    /// The generation's best genome and its fitness.
    GenerationChampion(G, f32),
    /// Empty.
    None,
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug)]
pub struct EvolutionLogger<G> {
    reporting_level: ReportingLevel,
    logs: Vec<Log<G>>,
}

impl<G: Genome> EvolutionLogger<G> {
    /// Returns a logger with the appropiate reporting level.
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger<G> {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Store a snapshot of an evaluated generation.
    ///
    /// `fitnesses` must be aligned with the population's genomes.
    pub fn log<C>(
        &mut self,
        population: &Population<C, G>,
        fitnesses: &[f32],
        failed_evaluations: usize,
        champion_fitness: f32,
    ) where
        G: Genome<Config = C>,
    {
        let generation_sample = match self.reporting_level {
            ReportingLevel::AllGenomes => GenerationMemberRecord::All(
                population
                    .genomes()
                    .cloned()
                    .zip(fitnesses.iter().copied())
                    .collect(),
            ),
            ReportingLevel::GenerationChampion => match best_index(fitnesses) {
                Some(i) => GenerationMemberRecord::GenerationChampion(
                    population.as_slice()[i].clone(),
                    fitnesses[i],
                ),
                None => GenerationMemberRecord::None,
            },
            ReportingLevel::NoGenomes => GenerationMemberRecord::None,
        };
        self.logs.push(Log {
            generation_number: population.generation(),
            generation_sample,
            fitness: Stats::from(fitnesses.iter().copied()),
            genome_size: Stats::from(population.genomes().map(|g| g.size() as f32)),
            failed_evaluations,
            champion_fitness,
        })
    }

    /// Iterate over all logged snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &Log<G>> {
        self.logs.iter()
    }

    /// Returns the most recent snapshot.
    pub fn last(&self) -> Option<&Log<G>> {
        self.logs.last()
    }

    /// Consumes the logger, returning all snapshots.
    pub fn into_logs(self) -> Vec<Log<G>> {
        self.logs
    }
}

/// Returns the index of the first maximal fitness,
/// ignoring NaNs.
pub(crate) fn best_index(fitnesses: &[f32]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, fitness) in fitnesses.iter().enumerate() {
        if fitness.is_nan() {
            continue;
        }
        match best {
            Some(b) if fitnesses[b] >= *fitness => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Toy, ToyConfig};
    use crate::PopulationConfig;

    use std::num::NonZeroUsize;

    #[test]
    fn even_length_median() {
        let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied());
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.mean, 2.5);
    }

    #[test]
    fn empty_stats_are_nan() {
        assert!(Stats::from(std::iter::empty::<f32>()).mean.is_nan());
    }

    #[test]
    fn best_index_takes_first_maximum() {
        assert_eq!(best_index(&[0.1, 0.5, 0.3, 0.5]), Some(1));
        assert_eq!(best_index(&[f32::NAN, 0.2]), Some(1));
        assert_eq!(best_index(&[]), None);
    }

    #[test]
    fn log_respects_reporting_level() {
        let genomes = vec![Toy::of(&[1]), Toy::of(&[2, 3]), Toy::of(&[4])];
        let config = PopulationConfig {
            size: NonZeroUsize::new(3).unwrap(),
            num_parents: NonZeroUsize::new(1).unwrap(),
        };
        let population = Population::new_seeded(genomes, config, ToyConfig::default()).unwrap();
        let fitnesses = [0.1, 0.8, 0.4];

        let mut logger = EvolutionLogger::new(ReportingLevel::GenerationChampion);
        logger.log(&population, &fitnesses, 1, 0.8);
        let log = logger.last().unwrap();
        assert!(matches!(
            &log.generation_sample,
            GenerationMemberRecord::GenerationChampion(g, f) if *g == Toy::of(&[2, 3]) && *f == 0.8
        ));
        assert_eq!(log.genome_size.maximum, 2.0);
        assert_eq!(log.failed_evaluations, 1);

        let mut logger = EvolutionLogger::new(ReportingLevel::AllGenomes);
        logger.log(&population, &fitnesses, 0, 0.8);
        assert!(matches!(
            &logger.last().unwrap().generation_sample,
            GenerationMemberRecord::All(all) if all.len() == 3
        ));
    }
}
