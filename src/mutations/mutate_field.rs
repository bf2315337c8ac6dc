use crate::{genome::Genome, parameters::Parameters, rng::EngineRng};

use super::{Mutation, MutationError, MutationResult};

impl Mutation {
    /// Mutates one uniformly random field gene, see [`crate::genes::FieldGene::mutate`].
    pub fn mutate_field(
        genome: &mut Genome,
        rng: &mut EngineRng,
        parameters: &Parameters,
    ) -> MutationResult {
        if genome.field_genes.is_empty() {
            return Err(MutationError::NoFieldGene);
        }

        let index = rng.index(genome.field_genes.len());
        genome.field_genes[index].mutate(rng, parameters);

        Ok(())
    }
}
