//! The search drives a population through a fixed number of
//! generations (evaluate, track the champion, select, breed),
//! then retrains the champion and reports on the run.
mod champion;
mod config;
mod errors;

pub use champion::Champion;
pub use config::SearchConfig;
pub use errors::SearchError;

use crate::artifacts::{ArtifactStore, BEST_MODEL_KEY};
use crate::evaluation::{EvaluationPool, Evaluator, Retrained};
use crate::logging::{best_index, EvolutionLogger, Log};
use crate::{Genome, Population, PopulationConfig, PopulationError};
use champion::ChampionTracker;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use std::path::PathBuf;

/// Fitness assigned to genomes whose evaluation failed.
pub const FAILED_FITNESS: f32 = 0.0;

/// The outcome of a completed search.
#[derive(Clone, Debug)]
pub struct SearchReport<G, M> {
    /// Best genome over all generations.
    pub champion: Champion<G>,
    /// The champion's retrained model and its accuracy.
    pub retrained: Retrained<M>,
    /// Where the retrained model was persisted, if anywhere.
    pub artifact: Option<PathBuf>,
    /// One snapshot per evaluated generation.
    pub logs: Vec<Log<G>>,
}

/// A genetic architecture search.
pub struct Search<G: Genome, E> {
    config: SearchConfig,
    population: Population<G::Config, G>,
    evaluator: E,
    pool: EvaluationPool,
    champion: ChampionTracker<G>,
    logger: EvolutionLogger<G>,
    artifacts: Option<ArtifactStore>,
    rng: StdRng,
}

impl<G, E> Search<G, E>
where
    G: Genome,
    E: Evaluator<G>,
{
    /// Validates the configurations and creates the
    /// initial random population.
    ///
    /// # Errors
    /// Returns an error if any configuration is invalid,
    /// or if the evaluation workers could not be started.
    pub fn new(
        config: SearchConfig,
        population_config: PopulationConfig,
        genetic_config: G::Config,
        evaluator: E,
    ) -> Result<Search<G, E>, SearchError> {
        config.validate()?;
        population_config.validate()?;
        G::validate_config(&genetic_config).map_err(|e| SearchError::GeneticConfig {
            source: Box::new(e),
        })?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let population = Population::new(population_config, genetic_config, &mut rng)
            .map_err(|e| SearchError::GeneticConfig {
                source: Box::new(e),
            })?;
        let pool = match config.workers {
            Some(workers) => EvaluationPool::with_workers(workers)?,
            None => EvaluationPool::sequential(),
        };
        info!(
            "initial population of {} genomes created, evaluating with {} worker(s)",
            population.len(),
            pool.concurrency()
        );

        Ok(Search {
            logger: EvolutionLogger::new(config.reporting_level),
            artifacts: config.artifact_dir.clone().map(ArtifactStore::new),
            config,
            population,
            evaluator,
            pool,
            champion: ChampionTracker::new(),
            rng,
        })
    }

    /// Runs every generation, then retrains and persists the champion.
    ///
    /// # Errors
    /// Returns an error on fatal evaluation failures, structural
    /// breeding failures, or if the champion could not be retrained
    /// or persisted. Failures of single genomes are not errors:
    /// those genomes are given [`FAILED_FITNESS`].
    pub fn run(mut self) -> Result<SearchReport<G, E::Model>, SearchError>
    where
        E::Model: Serialize,
    {
        let generations = self.config.generations;
        for generation in 0..generations {
            let fitnesses = self.run_generation()?;
            if generation + 1 < generations {
                self.advance(&fitnesses)?;
            }
        }

        let champion = self
            .champion
            .champion()
            .cloned()
            .ok_or(SearchError::NoChampion)?;
        info!("search complete, best overall: {}", champion);

        let retrained = self.retrain(&champion)?;
        let artifact = match &self.artifacts {
            Some(store) => {
                let path = store.store(BEST_MODEL_KEY, &retrained.model)?;
                info!("saved the best model's parameters to {}", path.display());
                Some(path)
            }
            None => None,
        };

        Ok(SearchReport {
            champion,
            retrained,
            artifact,
            logs: self.logger.into_logs(),
        })
    }

    /// Evaluates the current generation, updates the champion
    /// and logs the generation. Returns the fitnesses, aligned
    /// with the population.
    pub fn run_generation(&mut self) -> Result<Vec<f32>, SearchError> {
        let (fitnesses, failed) = self.evaluate_generation()?;
        let generation = self.population.generation();
        let failures = failed.iter().filter(|f| **f).count();

        // Failed genomes stay selectable at FAILED_FITNESS
        // but never become champion.
        let eligible: Vec<f32> = fitnesses
            .iter()
            .zip(&failed)
            .map(|(fitness, failed)| if *failed { f32::NAN } else { *fitness })
            .collect();
        if let Some(best) = best_index(&eligible) {
            let genome = &self.population.as_slice()[best];
            info!(
                "generation {}, best fitness: {:.4}, best architecture: {}",
                generation + 1,
                fitnesses[best],
                genome
            );
            if self.champion.offer(genome, fitnesses[best], generation) {
                debug!("new champion found in generation {}", generation + 1);
            }
        }
        self.logger
            .log(&self.population, &fitnesses, failures, self.champion.fitness());
        Ok(fitnesses)
    }

    /// Selects the parents from the evaluated generation
    /// and breeds the next one.
    pub fn advance(&mut self, fitnesses: &[f32]) -> Result<(), SearchError> {
        let parents = self
            .population
            .select(fitnesses)
            .map_err(|e| self.population_error(e))?;
        self.population
            .breed(parents, &mut self.rng)
            .map_err(|e| self.population_error(e))
    }

    /// Returns the best genome found so far.
    pub fn champion(&self) -> Option<&Champion<G>> {
        self.champion.champion()
    }

    pub fn population(&self) -> &Population<G::Config, G> {
        &self.population
    }

    pub fn logger(&self) -> &EvolutionLogger<G> {
        &self.logger
    }

    /// Returns the fitnesses and whether each evaluation failed,
    /// both aligned with the population.
    fn evaluate_generation(&mut self) -> Result<(Vec<f32>, Vec<bool>), SearchError> {
        let generation = self.population.generation();
        let total = self.population.len();
        // Seeds are drawn before dispatch, so results don't
        // depend on which worker evaluates which genome.
        let seeds: Vec<u64> = (0..total).map(|_| self.rng.gen()).collect();
        let results = self
            .pool
            .evaluate_all(&self.evaluator, self.population.as_slice(), &seeds);

        let mut fitnesses = Vec::with_capacity(total);
        let mut failed = Vec::with_capacity(total);
        for (index, (genome, result)) in self.population.genomes().zip(results).enumerate() {
            match result {
                Ok(fitness) => {
                    info!(
                        "genome {}/{} evaluated, fitness (i.e. accuracy): {:.4}",
                        index + 1,
                        total,
                        fitness
                    );
                    fitnesses.push(fitness);
                    failed.push(false);
                }
                Err(e) if self.evaluator.is_fatal(&e) => {
                    return Err(SearchError::Evaluation {
                        generation: generation + 1,
                        genome: index + 1,
                        description: genome.to_string(),
                        champion: self.champion_summary(),
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    warn!(
                        "genome {}/{} ({}) failed evaluation, assigning fitness {}: {}",
                        index + 1,
                        total,
                        genome,
                        FAILED_FITNESS,
                        e
                    );
                    fitnesses.push(FAILED_FITNESS);
                    failed.push(true);
                }
            }
        }
        info!(
            "all genomes in generation {} have been evaluated",
            generation + 1
        );
        Ok((fitnesses, failed))
    }

    fn retrain(&mut self, champion: &Champion<G>) -> Result<Retrained<E::Model>, SearchError> {
        info!("re-training the best architecture found: {}", champion.genome());
        let seed = self.rng.gen();
        let retrained = self
            .evaluator
            .retrain(champion.genome(), seed)
            .map_err(|e| SearchError::Retrain {
                champion: champion.to_string(),
                source: Box::new(e),
            })?;
        info!(
            "re-training complete, validation accuracy: {:.4}",
            retrained.accuracy
        );
        Ok(retrained)
    }

    fn population_error(&self, source: PopulationError) -> SearchError {
        SearchError::Population {
            generation: self.population.generation() + 1,
            champion: self.champion_summary(),
            source,
        }
    }

    fn champion_summary(&self) -> Option<String> {
        self.champion.champion().map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Toy, ToyConfig, ToyEvaluationError, ToyEvaluator};

    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn configs(
        generations: usize,
        size: usize,
        parents: usize,
    ) -> (SearchConfig, PopulationConfig) {
        (
            SearchConfig {
                generations,
                seed: Some(17),
                ..SearchConfig::default()
            },
            PopulationConfig {
                size: NonZeroUsize::new(size).unwrap(),
                num_parents: NonZeroUsize::new(parents).unwrap(),
            },
        )
    }

    fn healthy() -> ToyEvaluator {
        ToyEvaluator {
            poison: None,
            fatal: false,
        }
    }

    #[test]
    fn champion_fitness_never_decreases() {
        let (config, population_config) = configs(8, 10, 3);
        let search: Search<Toy, _> =
            Search::new(config, population_config, ToyConfig::default(), healthy()).unwrap();
        let report = search.run().unwrap();

        assert_eq!(report.logs.len(), 8);
        for pair in report.logs.windows(2) {
            assert!(pair[1].champion_fitness >= pair[0].champion_fitness);
        }
        let best_logged = report
            .logs
            .iter()
            .map(|l| l.fitness.maximum)
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(report.champion.fitness(), best_logged);
        assert_eq!(report.retrained.model, report.champion.genome().values());
        assert!(report.artifact.is_none());
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let (config, population_config) = configs(3, 6, 2);
            Search::<Toy, _>::new(config, population_config, ToyConfig::default(), healthy())
                .unwrap()
                .run()
                .unwrap()
        };
        assert_eq!(run().champion, run().champion);
    }

    #[test]
    fn parallel_run_matches_sequential_run() {
        let run = |workers| {
            let (mut config, population_config) = configs(3, 8, 2);
            config.workers = workers;
            Search::<Toy, _>::new(config, population_config, ToyConfig::default(), healthy())
                .unwrap()
                .run()
                .unwrap()
        };
        assert_eq!(
            run(None).champion,
            run(Some(NonZeroUsize::new(3).unwrap())).champion
        );
    }

    #[test]
    fn failing_genomes_are_disqualified() {
        let (config, population_config) = configs(3, 12, 4);
        let evaluator = ToyEvaluator {
            poison: Some(4),
            fatal: false,
        };
        let report =
            Search::<Toy, _>::new(config, population_config, ToyConfig::default(), evaluator)
                .unwrap()
                .run()
                .unwrap();

        assert!(!report.champion.genome().values().contains(&4));
        assert!(report.logs.iter().any(|l| l.failed_evaluations > 0));
    }

    #[test]
    fn failed_genomes_never_become_champion() {
        // Healthy genomes hold only zeros and score 0.0, tying
        // with the FAILED_FITNESS of genomes holding a 4.
        let genetic_config = ToyConfig {
            values: vec![0, 4],
            ..ToyConfig::default()
        };
        let evaluator = || ToyEvaluator {
            poison: Some(4),
            fatal: false,
        };
        let mut completed = 0;
        for seed in 0..20 {
            let (mut config, population_config) = configs(1, 6, 2);
            config.seed = Some(seed);
            let result = Search::<Toy, _>::new(
                config,
                population_config,
                genetic_config.clone(),
                evaluator(),
            )
            .unwrap()
            .run();
            match result {
                Ok(report) => {
                    assert!(!report.champion.genome().values().contains(&4));
                    assert_eq!(report.champion.fitness(), 0.0);
                    completed += 1;
                }
                // Every genome of the generation failed.
                Err(SearchError::NoChampion) => {}
                Err(other) => panic!("seed {}: unexpected error: {}", seed, other),
            }
        }
        assert!(completed > 0);
    }

    /// Scores like a healthy [`ToyEvaluator`] for the first
    /// `healthy_calls` evaluations, then fails fatally.
    struct FailsLater {
        healthy_calls: usize,
        calls: AtomicUsize,
    }

    impl Evaluator<Toy> for FailsLater {
        type Model = Vec<u8>;
        type Error = ToyEvaluationError;

        fn evaluate(&self, genome: &Toy, seed: u64) -> Result<f32, ToyEvaluationError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) >= self.healthy_calls {
                return Err(ToyEvaluationError::Unavailable);
            }
            healthy().evaluate(genome, seed)
        }

        fn retrain(
            &self,
            genome: &Toy,
            seed: u64,
        ) -> Result<Retrained<Vec<u8>>, ToyEvaluationError> {
            healthy().retrain(genome, seed)
        }

        fn is_fatal(&self, _error: &ToyEvaluationError) -> bool {
            true
        }
    }

    #[test]
    fn fatal_failures_report_the_champion_so_far() {
        let (config, population_config) = configs(3, 4, 2);
        let evaluator = FailsLater {
            healthy_calls: 4,
            calls: AtomicUsize::new(0),
        };
        let error =
            Search::<Toy, _>::new(config, population_config, ToyConfig::default(), evaluator)
                .unwrap()
                .run()
                .unwrap_err();

        let message = error.to_string();
        match error {
            SearchError::Evaluation {
                generation,
                genome,
                champion,
                ..
            } => {
                assert_eq!(generation, 2);
                assert_eq!(genome, 1);
                let champion = champion.unwrap();
                assert!(champion.contains("generation 1"));
                assert!(message.contains(&champion));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn fatal_failures_abort_the_run() {
        let (config, population_config) = configs(3, 12, 4);
        let evaluator = ToyEvaluator {
            poison: Some(4),
            fatal: true,
        };
        let error =
            Search::<Toy, _>::new(config, population_config, ToyConfig::default(), evaluator)
                .unwrap()
                .run()
                .unwrap_err();

        match error {
            SearchError::Evaluation {
                generation,
                description,
                ..
            } => {
                assert!(generation >= 1);
                assert!(description.contains('4'));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn invalid_configurations_fail_fast() {
        let (mut config, population_config) = configs(0, 4, 2);
        assert!(matches!(
            Search::<Toy, _>::new(
                config.clone(),
                population_config.clone(),
                ToyConfig::default(),
                healthy(),
            ),
            Err(SearchError::Config(_))
        ));

        config.generations = 1;
        let too_many_parents = PopulationConfig {
            num_parents: NonZeroUsize::new(5).unwrap(),
            ..population_config.clone()
        };
        assert!(matches!(
            Search::<Toy, _>::new(
                config.clone(),
                too_many_parents,
                ToyConfig::default(),
                healthy(),
            ),
            Err(SearchError::Config(_))
        ));

        let empty = ToyConfig {
            values: vec![],
            ..ToyConfig::default()
        };
        assert!(matches!(
            Search::<Toy, _>::new(config, population_config, empty, healthy()),
            Err(SearchError::GeneticConfig { .. })
        ));
    }

    #[test]
    fn retrained_champion_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let (mut config, population_config) = configs(2, 4, 2);
        config.artifact_dir = Some(dir.path().to_path_buf());

        let report =
            Search::<Toy, _>::new(config, population_config, ToyConfig::default(), healthy())
                .unwrap()
                .run()
                .unwrap();

        let path = report.artifact.unwrap();
        assert!(path.ends_with("best_model_parameters.ron"));
        let stored: Vec<u8> = ArtifactStore::new(dir.path()).load(BEST_MODEL_KEY).unwrap();
        assert_eq!(stored, report.retrained.model);
    }

    #[test]
    fn single_genome_population() {
        let (config, population_config) = configs(3, 1, 1);
        let report =
            Search::<Toy, _>::new(config, population_config, ToyConfig::default(), healthy())
                .unwrap()
                .run()
                .unwrap();
        assert_eq!(report.logs.len(), 3);
        assert!(report.logs.iter().all(|l| l.fitness.maximum == report.champion.fitness()));
    }
}
