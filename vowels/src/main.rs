mod config;
mod corpus;
mod preprocess;

use config::RunConfig;
use corpus::{Corpus, Vowel};

use anyhow::Context;
use clap::Parser;
use log::info;
use oxinas::{Search, SearchReport};
use oxinas_nn::evaluation::TrainingEvaluator;
use oxinas_nn::genomics::LayerGenome;
use oxinas_nn::networks::Network;

use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Genetic search for feed-forward vowel classifiers.
#[derive(Parser)]
#[command(name = "vowels", version, about)]
struct Cli {
    /// RON corpus of vowel recordings
    #[arg(required_unless_present = "synthetic", conflicts_with = "synthetic")]
    corpus: Option<PathBuf>,
    /// Search on random clusters instead of recordings
    #[arg(long)]
    synthetic: bool,
    /// RON run configuration (defaults are used if absent)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed of the search, overriding the configuration
    #[arg(long)]
    seed: Option<u64>,
    /// Number of generations, overriding the configuration
    #[arg(long)]
    generations: Option<usize>,
    /// Number of evaluator threads, overriding the configuration
    #[arg(short, long)]
    workers: Option<NonZeroUsize>,
    /// Directory the best model is saved to, overriding the configuration
    #[arg(long, value_name = "PATH")]
    artifact_dir: Option<PathBuf>,
}

impl Cli {
    fn run_config(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("loading run configuration {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.search.seed = Some(seed);
        }
        if let Some(generations) = self.generations {
            config.search.generations = generations;
        }
        if let Some(workers) = self.workers {
            config.search.workers = Some(workers);
        }
        if let Some(dir) = &self.artifact_dir {
            config.search.artifact_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.run_config()?;

    let provider = match &cli.corpus {
        Some(path) => {
            let corpus = Corpus::load(path)
                .with_context(|| format!("loading corpus {}", path.display()))?;
            let counts = corpus.counts();
            for vowel in Vowel::ALL {
                info!("{} recordings of vowel {}", counts[vowel.index()], vowel);
            }
            preprocess::prepare(&corpus, &config.data).context("preprocessing corpus")?
        }
        None => preprocess::synthetic(&config.data).context("generating synthetic data")?,
    };
    info!(
        "{} training and {} validation samples, {} features each",
        provider.train().len(),
        provider.validation().len(),
        provider.input_dim()
    );

    let evaluator = TrainingEvaluator::new(provider, config.training)
        .context("invalid training configuration")?;
    let search =
        Search::<LayerGenome, _>::new(config.search, config.population, config.genetic, evaluator)?;
    let report = search.run().context("architecture search failed")?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &SearchReport<LayerGenome, Network>) {
    for log in &report.logs {
        println!(
            "generation {}: fitness {:?}, layers {:?}, {} failed evaluation(s)",
            log.generation_number + 1,
            log.fitness,
            log.genome_size,
            log.failed_evaluations
        );
    }
    println!("best fitness: {:.4}", report.champion.fitness());
    println!("found in generation: {}", report.champion.generation() + 1);
    println!("best architecture: {}", report.champion.genome());
    println!("retrained network: {}", report.retrained.model);
    println!("retrained validation accuracy: {:.4}", report.retrained.accuracy);
    if let Some(path) = &report.artifact {
        println!("model parameters saved to {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_configuration() {
        let cli = Cli::try_parse_from(["vowels", "--synthetic", "--seed", "3", "-w", "2"]).unwrap();
        let config = cli.run_config().unwrap();
        assert_eq!(config.search.seed, Some(3));
        assert_eq!(config.search.workers, NonZeroUsize::new(2));
        assert_eq!(config.search.generations, 4);
    }

    #[test]
    fn a_data_source_is_required() {
        assert!(Cli::try_parse_from(["vowels"]).is_err());
        assert!(Cli::try_parse_from(["vowels", "corpus.ron", "--synthetic"]).is_err());
        assert!(Cli::try_parse_from(["vowels", "corpus.ron"]).is_ok());
    }
}
