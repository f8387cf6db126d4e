use rand::Rng;

use std::error::Error;
use std::fmt;

/// An interface for genomes that can be evolved by a [`Population`].
///
/// Genomes are treated as immutable values: every genetic
/// operator returns a new genome and leaves its inputs untouched,
/// so scored members of a generation can never be altered by
/// breeding.
///
/// [`Population`]: crate::Population
pub trait Genome: Clone + fmt::Display + Send + Sync {
    type Config;
    type Error: Error + Send + Sync + 'static;

    /// Checks that `config` can be used to generate and
    /// vary genomes, before any evolution takes place.
    fn validate_config(config: &Self::Config) -> Result<(), Self::Error>;

    /// Returns a randomized genome.
    fn random<R: Rng + ?Sized>(config: &Self::Config, rng: &mut R) -> Result<Self, Self::Error>;

    /// Combines two genomes and returns a "child" genome.
    fn mate<R: Rng + ?Sized>(
        parent1: &Self,
        parent2: &Self,
        config: &Self::Config,
        rng: &mut R,
    ) -> Result<Self, Self::Error>;

    /// Returns a randomly varied copy of the genome.
    fn mutate<R: Rng + ?Sized>(&self, config: &Self::Config, rng: &mut R)
        -> Result<Self, Self::Error>;

    /// Returns the number of structural units (e.g. layers)
    /// in the genome, used for population statistics.
    fn size(&self) -> usize;
}
