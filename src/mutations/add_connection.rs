use crate::{
    genes::ConnectionGene, genome::Genome, innovation::InnovationRegistry,
    parameters::Parameters, rng::EngineRng,
};

use super::{Mutation, MutationError, MutationResult};

impl Mutation {
    /// Adds a new connection between a random legal pair of field genes.
    ///
    /// Sources come from the input and hidden fields, targets from the hidden
    /// and output fields. A pair that is already connected (enabled or not)
    /// or would loop onto itself rejects the mutation; the innovation number
    /// is obtained through the registry so identical tuples created elsewhere
    /// this generation share it.
    pub fn add_connection(
        genome: &mut Genome,
        rng: &mut EngineRng,
        innovations: &mut InnovationRegistry,
        parameters: &Parameters,
    ) -> MutationResult {
        let tuple = genome
            .random_connection_tuple(rng)
            .ok_or(MutationError::NoConnectionPossible)?;

        let innovation = innovations.innovation_for(tuple);
        genome.push_connection(ConnectionGene::new(tuple, innovation, rng, parameters));

        Ok(())
    }
}
