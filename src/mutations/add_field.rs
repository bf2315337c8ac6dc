use crate::{
    genes::{ConnectionGene, ConnectionTuple},
    genome::Genome,
    innovation::InnovationRegistry,
    parameters::Parameters,
    rng::EngineRng,
};

use super::{Mutation, MutationError, MutationResult};

impl Mutation {
    /// Splits a random enabled connection with a new hidden field gene.
    ///
    /// The picked connection is disabled and replaced by two fresh
    /// connections routed through the new field, both inheriting the disabled
    /// connection's kernel. Both tuples are registered with the innovation
    /// registry so parallel splits in other genomes align.
    pub fn add_field(
        genome: &mut Genome,
        rng: &mut EngineRng,
        innovations: &mut InnovationRegistry,
        parameters: &Parameters,
    ) -> MutationResult {
        let index = genome
            .random_enabled_connection(rng)
            .ok_or(MutationError::NoEnabledConnection)?;

        let (tuple, kernel) = {
            let connection = &genome.connection_genes[index];
            (connection.tuple, connection.kernel.clone())
        };
        genome.connection_genes[index].disable();

        let hidden = genome.add_hidden_gene(rng, parameters);

        let tuple_in = ConnectionTuple::new(tuple.input, hidden);
        let innovation_in = innovations.innovation_for(tuple_in);
        genome.push_connection(ConnectionGene::with_kernel(
            tuple_in,
            innovation_in,
            kernel.clone(),
        ));

        let tuple_out = ConnectionTuple::new(hidden, tuple.output);
        let innovation_out = innovations.innovation_for(tuple_out);
        genome.push_connection(ConnectionGene::with_kernel(tuple_out, innovation_out, kernel));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Mutation, MutationError};
    use crate::{genes::FieldKind, genome::Genome, Engine};

    #[test]
    fn splitting_disables_the_old_connection() {
        let mut engine = Engine::default();
        let mut genome = Genome::default();

        let input = genome.add_input_gene(&mut engine.rng, &engine.parameters);
        let output = genome.add_output_gene(&mut engine.rng, &engine.parameters);
        genome.connect(input, output, &mut engine);

        assert!(Mutation::add_field(
            &mut genome,
            &mut engine.rng,
            &mut engine.innovations,
            &engine.parameters
        )
        .is_ok());

        assert_eq!(genome.field_genes.len(), 3);
        assert_eq!(genome.connection_genes.len(), 3);
        assert!(!genome.connection_genes[0].enabled);
        assert!(genome.connection_genes[1].enabled);
        assert!(genome.connection_genes[2].enabled);
        assert_eq!(genome.field_genes[2].kind, FieldKind::Hidden);
    }

    #[test]
    fn split_connections_inherit_the_kernel() {
        let mut engine = Engine::default();
        let mut genome = Genome::default();

        let input = genome.add_input_gene(&mut engine.rng, &engine.parameters);
        let output = genome.add_output_gene(&mut engine.rng, &engine.parameters);
        genome.connect(input, output, &mut engine);

        let kernel = genome.connection_genes[0].kernel.clone();

        Mutation::add_field(
            &mut genome,
            &mut engine.rng,
            &mut engine.innovations,
            &engine.parameters,
        )
        .unwrap();

        assert_eq!(genome.connection_genes[1].kernel, kernel);
        assert_eq!(genome.connection_genes[2].kernel, kernel);
    }

    #[test]
    fn no_enabled_connection_is_recoverable() {
        let mut engine = Engine::default();
        let mut genome = Genome::default();

        genome.add_input_gene(&mut engine.rng, &engine.parameters);
        genome.add_output_gene(&mut engine.rng, &engine.parameters);

        assert_eq!(
            Mutation::add_field(
                &mut genome,
                &mut engine.rng,
                &mut engine.innovations,
                &engine.parameters
            ),
            Err(MutationError::NoEnabledConnection)
        );
        assert_eq!(genome.field_genes.len(), 2);
    }
}
