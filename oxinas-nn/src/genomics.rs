//! Genomes are the focus of evolution in the search.
//! A [`LayerGenome`] is an ordered list of genes, each one
//! describing a hidden layer of a feed-forward classifier.
//! Genomes are values: crossover and mutation return new
//! genomes and never alter their inputs.

mod activations;
mod config;
mod errors;
mod genes;

pub use activations::ActivationType;
pub use config::{Blueprint, GeneticConfig, MutationConfig};
pub use errors::GenomeError;
pub use genes::Gene;

use oxinas::Genome;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::num::NonZeroUsize;

/// An ordered list of layer descriptors.
///
/// Suports Serde for convenient genome saving and loading.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct LayerGenome {
    genes: Vec<Gene>,
}

impl LayerGenome {
    /// Creates a genome from the specified genes,
    /// in layer order.
    pub fn new(genes: Vec<Gene>) -> LayerGenome {
        LayerGenome { genes }
    }

    /// Returns a random genome drawn from the blueprint:
    /// the layer count is uniform in `[1, max_n_layers]`,
    /// and each gene attribute is drawn uniformly and
    /// independently from its candidate list.
    ///
    /// # Errors
    /// Returns an error if a candidate list is empty.
    ///
    /// # Examples
    /// ```
    /// use oxinas_nn::genomics::{Blueprint, LayerGenome};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let blueprint = Blueprint::default();
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let genome = LayerGenome::from_blueprint(&blueprint, &mut rng).unwrap();
    ///
    /// assert!((1..=5).contains(&genome.len()));
    /// assert!(genome.genes().all(|g| blueprint.neurons.contains(&g.num_neurons())));
    /// ```
    pub fn from_blueprint<R: Rng + ?Sized>(
        blueprint: &Blueprint,
        rng: &mut R,
    ) -> Result<LayerGenome, GenomeError> {
        let layers = rng.gen_range(1..=blueprint.max_n_layers.get());
        (0..layers)
            .map(|_| {
                random_gene(
                    &blueprint.neurons,
                    &blueprint.activations,
                    &blueprint.dropout,
                    rng,
                )
            })
            .collect::<Result<_, _>>()
            .map(LayerGenome::new)
    }

    /// Strict uniform crossover: for every position and every
    /// attribute, the child's value is taken from either parent
    /// with equal probability.
    ///
    /// # Errors
    /// Returns an error naming both parents if their
    /// lengths differ.
    ///
    /// # Examples
    /// ```
    /// use oxinas_nn::genomics::{ActivationType, Gene, LayerGenome};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use std::num::NonZeroUsize;
    ///
    /// let gene = |n, a| Gene::new(NonZeroUsize::new(n).unwrap(), a, None);
    /// let parent1 = LayerGenome::new(vec![gene(4, ActivationType::ReLU)]);
    /// let parent2 = LayerGenome::new(vec![gene(8, ActivationType::Tanh)]);
    /// let mut rng = StdRng::seed_from_u64(0);
    ///
    /// let child = LayerGenome::crossover(&parent1, &parent2, &mut rng).unwrap();
    /// assert_eq!(child.len(), 1);
    ///
    /// let longer = LayerGenome::new(vec![gene(4, ActivationType::ReLU); 2]);
    /// assert!(LayerGenome::crossover(&parent1, &longer, &mut rng).is_err());
    /// ```
    pub fn crossover<R: Rng + ?Sized>(
        parent1: &LayerGenome,
        parent2: &LayerGenome,
        rng: &mut R,
    ) -> Result<LayerGenome, GenomeError> {
        if parent1.len() != parent2.len() {
            return Err(GenomeError::length_mismatch(parent1, parent2));
        }
        Ok(LayerGenome::new(
            parent1
                .genes
                .iter()
                .zip(&parent2.genes)
                .map(|(a, b)| a.uniform_crossover(b, rng))
                .collect(),
        ))
    }

    /// Returns a mutated copy of the genome: each gene is
    /// independently resampled, all attributes at once, with
    /// probability `mutation_rate`.
    pub fn mutated<R: Rng + ?Sized>(
        &self,
        config: &MutationConfig,
        rng: &mut R,
    ) -> Result<LayerGenome, GenomeError> {
        self.genes
            .iter()
            .map(|gene| {
                if rng.gen::<f32>() < config.mutation_rate {
                    random_gene(&config.neurons, &config.activations, &config.dropout, rng)
                } else {
                    Ok(*gene)
                }
            })
            .collect::<Result<_, _>>()
            .map(LayerGenome::new)
    }

    /// Returns `other` aligned to `len` genes: truncated if longer,
    /// padded with the tail genes of `longer` if shorter.
    fn aligned(other: &LayerGenome, longer: &LayerGenome, len: usize) -> LayerGenome {
        let mut genes: Vec<Gene> = other.genes.iter().take(len).copied().collect();
        if genes.len() < len {
            genes.extend_from_slice(&longer.genes[genes.len()..len]);
        }
        LayerGenome::new(genes)
    }

    /// Returns an iterator over the genome's genes, in layer order.
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.iter()
    }

    /// Returns the number of hidden layers.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

fn random_gene<R: Rng + ?Sized>(
    neurons: &[NonZeroUsize],
    activations: &[ActivationType],
    dropout: &[Option<f32>],
    rng: &mut R,
) -> Result<Gene, GenomeError> {
    let num_neurons = neurons
        .choose(rng)
        .ok_or(crate::ConfigError::EmptyCandidates("neurons"))?;
    let activation = activations
        .choose(rng)
        .ok_or(crate::ConfigError::EmptyCandidates("activations"))?;
    let dropout_rate = dropout
        .choose(rng)
        .ok_or(crate::ConfigError::EmptyCandidates("dropout"))?;
    Ok(Gene::new(*num_neurons, *activation, *dropout_rate))
}

impl Genome for LayerGenome {
    type Config = GeneticConfig;
    type Error = GenomeError;

    fn validate_config(config: &GeneticConfig) -> Result<(), GenomeError> {
        Ok(config.validate()?)
    }

    fn random<R: Rng + ?Sized>(
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<LayerGenome, GenomeError> {
        LayerGenome::from_blueprint(&config.blueprint, rng)
    }

    /// The child takes the length of a parent chosen by coin flip.
    /// The other parent is aligned to that length before strict
    /// crossover, so equal-length parents go through plain
    /// uniform crossover.
    fn mate<R: Rng + ?Sized>(
        parent1: &LayerGenome,
        parent2: &LayerGenome,
        _config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<LayerGenome, GenomeError> {
        let (template, other) = if rng.gen() {
            (parent1, parent2)
        } else {
            (parent2, parent1)
        };
        let longer = if template.len() >= other.len() { template } else { other };
        let aligned = LayerGenome::aligned(other, longer, template.len());
        if rng.gen() {
            LayerGenome::crossover(template, &aligned, rng)
        } else {
            LayerGenome::crossover(&aligned, template, rng)
        }
    }

    fn mutate<R: Rng + ?Sized>(
        &self,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<LayerGenome, GenomeError> {
        self.mutated(&config.mutation, rng)
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl fmt::Display for LayerGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, gene) in self.genes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", gene)?;
        }
        write!(f, "]")
    }
}
