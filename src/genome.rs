use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::{
    genes::{ConnectionGene, ConnectionTuple, FieldGene, FieldId, FieldKind, Innovation},
    mutations::Mutation,
    parameters::Parameters,
    rng::EngineRng,
    Engine,
};

pub mod distance;

/// Heritable description of a dynamic neural field architecture.
///
/// Field genes and connection genes are kept in insertion order. Field ids
/// are assigned per genome as the highest existing id plus one, so genomes
/// cloned from one seed share the ids of homologous fields and their
/// connection tuples align across the population, while crossover-induced id
/// gaps never lead to collisions.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub field_genes: Vec<FieldGene>,
    pub connection_genes: Vec<ConnectionGene>,
}

impl Genome {
    pub fn add_input_gene(&mut self, rng: &mut EngineRng, parameters: &Parameters) -> FieldId {
        self.add_field_gene(FieldKind::Input, rng, parameters)
    }

    pub fn add_output_gene(&mut self, rng: &mut EngineRng, parameters: &Parameters) -> FieldId {
        self.add_field_gene(FieldKind::Output, rng, parameters)
    }

    pub fn add_hidden_gene(&mut self, rng: &mut EngineRng, parameters: &Parameters) -> FieldId {
        self.add_field_gene(FieldKind::Hidden, rng, parameters)
    }

    fn add_field_gene(
        &mut self,
        kind: FieldKind,
        rng: &mut EngineRng,
        parameters: &Parameters,
    ) -> FieldId {
        // crossover may leave gaps in the id sequence, so the length alone
        // is not collision-safe
        let id = FieldId(
            self.field_genes
                .iter()
                .map(|gene| gene.id.0)
                .max()
                .unwrap_or(0)
                + 1,
        );
        self.field_genes.push(FieldGene::new(id, kind, rng, parameters));
        id
    }

    /// Connects two existing fields, drawing the innovation number through
    /// the engine's registry.
    pub fn connect(&mut self, input: FieldId, output: FieldId, engine: &mut Engine) -> Innovation {
        let Engine {
            parameters,
            rng,
            innovations,
            ..
        } = engine;

        let tuple = ConnectionTuple::new(input, output);
        let innovation = innovations.innovation_for(tuple);
        self.push_connection(ConnectionGene::new(tuple, innovation, rng, parameters));
        innovation
    }

    /// Applies exactly one of the five mutations, selected by the configured
    /// chances. Mutations that find nothing to act on leave the genome
    /// unchanged; the selected kind is reported either way so callers can
    /// keep statistics.
    pub fn mutate(&mut self, engine: &mut Engine) -> Mutation {
        let Engine {
            parameters,
            rng,
            innovations,
            ..
        } = engine;

        let selected = Mutation::select(rng, &parameters.mutation);

        let outcome = match selected {
            Mutation::AddField => Mutation::add_field(self, rng, innovations, parameters),
            Mutation::MutateField => Mutation::mutate_field(self, rng, parameters),
            Mutation::AddConnection => Mutation::add_connection(self, rng, innovations, parameters),
            Mutation::MutateConnection => Mutation::mutate_connection(self, rng, parameters),
            Mutation::ToggleConnection => Mutation::toggle_connection(self, rng),
        };

        if let Err(skipped) = outcome {
            debug!("skipped {:?}: {}", selected, skipped);
        }

        if let Some(tuple) = self.duplicate_tuple() {
            error!("mutation produced duplicate connection genes for tuple {}", tuple);
        }

        selected
    }

    /// First tuple appearing on more than one connection gene, if any.
    pub fn duplicate_tuple(&self) -> Option<ConnectionTuple> {
        for (index, gene) in self.connection_genes.iter().enumerate() {
            if self.connection_genes[index + 1..]
                .iter()
                .any(|other| other.tuple == gene.tuple)
            {
                return Some(gene.tuple);
            }
        }
        None
    }

    /// Number of connection genes; the genome size used for compatibility.
    pub fn len(&self) -> usize {
        self.connection_genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connection_genes.is_empty()
    }

    pub fn innovations(&self) -> impl Iterator<Item = Innovation> + '_ {
        self.connection_genes.iter().map(|gene| gene.innovation)
    }

    pub fn max_innovation(&self) -> Option<Innovation> {
        self.innovations().max()
    }

    pub fn connection_by_innovation(&self, innovation: Innovation) -> Option<&ConnectionGene> {
        self.connection_genes
            .iter()
            .find(|gene| gene.innovation == innovation)
    }

    /// Equality of connection genes is by innovation number.
    pub fn contains_innovation(&self, innovation: Innovation) -> bool {
        self.connection_by_innovation(innovation).is_some()
    }

    pub fn contains_tuple(&self, tuple: ConnectionTuple) -> bool {
        self.connection_genes.iter().any(|gene| gene.tuple == tuple)
    }

    pub fn field_by_id(&self, id: FieldId) -> Option<&FieldGene> {
        self.field_genes.iter().find(|gene| gene.id == id)
    }

    pub fn contains_field(&self, id: FieldId) -> bool {
        self.field_by_id(id).is_some()
    }

    pub fn push_connection(&mut self, gene: ConnectionGene) {
        self.connection_genes.push(gene);
    }

    /// Adds a field gene unless its id is already taken, used by crossover.
    pub fn insert_field_gene(&mut self, gene: FieldGene) {
        if !self.contains_field(gene.id) {
            self.field_genes.push(gene);
        }
    }

    /// Adds a connection gene unless its innovation is already present, used
    /// by crossover.
    pub fn insert_connection_gene(&mut self, gene: ConnectionGene) {
        if !self.contains_innovation(gene.innovation) {
            self.connection_genes.push(gene);
        }
    }

    /// Index of a random enabled connection gene.
    pub fn random_enabled_connection(&self, rng: &mut EngineRng) -> Option<usize> {
        let enabled = self
            .connection_genes
            .iter()
            .enumerate()
            .filter(|(_, gene)| gene.enabled)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        if enabled.is_empty() {
            None
        } else {
            Some(enabled[rng.index(enabled.len())])
        }
    }

    /// One attempt at drawing a new legal connection tuple: a random source
    /// from the input and hidden fields, a random distinct target from the
    /// hidden and output fields. Pairs that exist already reject the attempt.
    pub fn random_connection_tuple(&self, rng: &mut EngineRng) -> Option<ConnectionTuple> {
        let sources = self
            .field_genes
            .iter()
            .filter(|gene| matches!(gene.kind, FieldKind::Input | FieldKind::Hidden))
            .map(|gene| gene.id)
            .collect::<Vec<_>>();
        if sources.is_empty() {
            return None;
        }
        let source = sources[rng.index(sources.len())];

        let targets = self
            .field_genes
            .iter()
            .filter(|gene| matches!(gene.kind, FieldKind::Hidden | FieldKind::Output))
            .filter(|gene| gene.id != source)
            .map(|gene| gene.id)
            .collect::<Vec<_>>();
        if targets.is_empty() {
            return None;
        }
        let target = targets[rng.index(targets.len())];

        let tuple = ConnectionTuple::new(source, target);
        if self.contains_tuple(tuple) {
            None
        } else {
            Some(tuple)
        }
    }
}
