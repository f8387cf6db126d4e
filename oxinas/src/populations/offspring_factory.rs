use super::*;

use log::debug;
use rand::seq::index;

/// Auxiliary type for offspring generation.
/// Breeds children from a pool of selected
/// parents according to the genetic config.
pub(super) struct OffspringFactory<'a, C, G> {
    parents: &'a [G],
    genetic_config: &'a C,
}

impl<'a, C, G> OffspringFactory<'a, C, G>
where
    G: Genome<Config = C>,
{
    pub(super) fn new(parents: &'a [G], genetic_config: &'a C) -> OffspringFactory<'a, C, G> {
        OffspringFactory {
            parents,
            genetic_config,
        }
    }

    /// Generate `count` mutated children.
    ///
    /// Each child draws its own pair of distinct parents,
    /// so a parent may be reused across children. A pool
    /// holding a single parent breeds asexually: each child
    /// is a mutated copy of that parent.
    pub(super) fn generate_offspring<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<G>, PopulationError> {
        if count > 0 && self.parents.len() == 1 {
            debug!("single-parent pool, breeding {} asexual offspring", count);
        }
        (0..count).map(|_| self.breed_child(rng)).collect()
    }

    fn breed_child<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<G, PopulationError> {
        let child = match self.parents {
            [] => return Err(PopulationError::NoParents),
            [only] => only.clone(),
            parents => {
                let pair = index::sample(rng, parents.len(), 2);
                let (parent1, parent2) = (&parents[pair.index(0)], &parents[pair.index(1)]);
                G::mate(parent1, parent2, self.genetic_config, rng).map_err(|e| {
                    PopulationError::Mating {
                        parent1: parent1.to_string(),
                        parent2: parent2.to_string(),
                        source: Box::new(e),
                    }
                })?
            }
        };
        child
            .mutate(self.genetic_config, rng)
            .map_err(|e| PopulationError::Mutation {
                genome: child.to_string(),
                source: Box::new(e),
            })
    }
}
