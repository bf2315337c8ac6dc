use crate::{genome::Genome, parameters::Parameters, rng::EngineRng};

use super::{Mutation, MutationError, MutationResult};

impl Mutation {
    /// Mutates one uniformly random connection gene, see
    /// [`crate::genes::ConnectionGene::mutate`].
    pub fn mutate_connection(
        genome: &mut Genome,
        rng: &mut EngineRng,
        parameters: &Parameters,
    ) -> MutationResult {
        if genome.connection_genes.is_empty() {
            return Err(MutationError::NoConnectionGene);
        }

        let index = rng.index(genome.connection_genes.len());
        genome.connection_genes[index].mutate(rng, parameters);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Mutation, MutationError};
    use crate::{genome::Genome, Engine};

    #[test]
    fn unconnected_genome_is_recoverable() {
        let mut engine = Engine::default();
        let mut genome = Genome::default();

        genome.add_input_gene(&mut engine.rng, &engine.parameters);

        assert_eq!(
            Mutation::mutate_connection(&mut genome, &mut engine.rng, &engine.parameters),
            Err(MutationError::NoConnectionGene)
        );
    }
}
