use serde::{Deserialize, Serialize};

use std::fmt;

/// The best genome found over a whole search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Champion<G> {
    genome: G,
    fitness: f32,
    generation: usize,
}

impl<G> Champion<G> {
    pub fn genome(&self) -> &G {
        &self.genome
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Returns the (zero-based) generation the champion was found in.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn into_genome(self) -> G {
        self.genome
    }
}

impl<G: fmt::Display> fmt::Display for Champion<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (fitness {:.4}, generation {})",
            self.genome,
            self.fitness,
            self.generation + 1
        )
    }
}

/// Holds the champion across generations.
/// Replaced only on strict improvement.
#[derive(Clone, Debug)]
pub(crate) struct ChampionTracker<G> {
    champion: Option<Champion<G>>,
}

impl<G: Clone> ChampionTracker<G> {
    pub(crate) fn new() -> ChampionTracker<G> {
        ChampionTracker { champion: None }
    }

    /// Best fitness seen so far, −∞ before any update.
    pub(crate) fn fitness(&self) -> f32 {
        self.champion
            .as_ref()
            .map_or(f32::NEG_INFINITY, |c| c.fitness)
    }

    pub(crate) fn champion(&self) -> Option<&Champion<G>> {
        self.champion.as_ref()
    }

    /// Offers a generation's best genome. Returns whether
    /// it replaced the current champion.
    pub(crate) fn offer(&mut self, genome: &G, fitness: f32, generation: usize) -> bool {
        if fitness > self.fitness() {
            self.champion = Some(Champion {
                genome: genome.clone(),
                fitness,
                generation,
            });
            true
        } else {
            false
        }
    }
}
