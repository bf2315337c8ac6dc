use crate::{genome::Genome, rng::EngineRng};

use super::{Mutation, MutationError, MutationResult};

impl Mutation {
    /// Flips the `enabled` flag of one uniformly random connection gene.
    pub fn toggle_connection(genome: &mut Genome, rng: &mut EngineRng) -> MutationResult {
        if genome.connection_genes.is_empty() {
            return Err(MutationError::NoConnectionGene);
        }

        let index = rng.index(genome.connection_genes.len());
        genome.connection_genes[index].toggle();

        Ok(())
    }
}
