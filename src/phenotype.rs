//! Seam to the external neural field simulator.
//!
//! The engine never integrates fields itself. Task evaluators own a
//! [`Simulation`] implementation and use [`build`] to translate a genome into
//! simulator elements and interactions; afterwards they stimulate the fields,
//! step the simulation and read bumps back through [`FieldObservation`].

use crate::{
    genes::{ConnectionGene, FieldId, Kernel, NeuralFieldParams},
    genome::Genome,
    parameters::FieldDimensions,
};

/// A localized sustained activation pattern of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Bump {
    pub centroid: f64,
    pub amplitude: f64,
    pub width: f64,
}

/// Value-owned description of a simulator element.
///
/// Genes keep their parameters to themselves; the simulator receives copies
/// and never shares mutable state with the genome.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    NeuralField {
        name: String,
        dimensions: FieldDimensions,
        field: NeuralFieldParams,
    },
    Kernel {
        name: String,
        dimensions: FieldDimensions,
        kernel: Kernel,
    },
}

impl Element {
    pub fn name(&self) -> &str {
        match self {
            Element::NeuralField { name, .. } | Element::Kernel { name, .. } => name,
        }
    }
}

/// Interface of the external simulator consumed by the engine.
pub trait Simulation {
    fn add_element(&mut self, element: Element);
    fn remove_element(&mut self, name: &str);
    fn create_interaction(&mut self, source: &str, port: &str, target: &str);
    fn init(&mut self);
    fn step(&mut self);
    fn close(&mut self);
}

/// Read access to field state, implemented by the external simulator.
pub trait FieldObservation {
    fn bumps(&self, field: &str) -> Vec<Bump>;
    fn highest_activation(&self, field: &str) -> f64;
}

/// Simulator name of the field built for a field gene, e.g. for targeting
/// stimuli at `nf 1`.
pub fn field_name(id: FieldId) -> String {
    format!("nf {}", id.0)
}

fn self_kernel_name(id: FieldId) -> String {
    format!("sk {}", id.0)
}

fn connection_kernel_name(gene: &ConnectionGene) -> String {
    format!(
        "ck {}-{} {}",
        gene.tuple.input.0, gene.tuple.output.0, gene.innovation.0
    )
}

/// Translates a genome into a runnable simulation.
///
/// Every field gene contributes its field and self-kernel with bidirectional
/// field-kernel coupling; every *enabled* connection gene contributes its
/// kernel wired from the source field to the target field. Disabled
/// connections are omitted entirely.
pub fn build(genome: &Genome, dimensions: FieldDimensions, simulation: &mut impl Simulation) {
    for gene in &genome.field_genes {
        let field = field_name(gene.id);
        let kernel = self_kernel_name(gene.id);

        simulation.add_element(Element::NeuralField {
            name: field.clone(),
            dimensions,
            field: gene.field.clone(),
        });
        simulation.add_element(Element::Kernel {
            name: kernel.clone(),
            dimensions,
            kernel: gene.self_kernel.clone(),
        });

        simulation.create_interaction(&field, "output", &kernel);
        simulation.create_interaction(&kernel, "output", &field);
    }

    for gene in genome.connection_genes.iter().filter(|gene| gene.enabled) {
        let kernel = connection_kernel_name(gene);

        simulation.add_element(Element::Kernel {
            name: kernel.clone(),
            dimensions,
            kernel: gene.kernel.clone(),
        });

        simulation.create_interaction(&field_name(gene.tuple.input), "output", &kernel);
        simulation.create_interaction(&kernel, "output", &field_name(gene.tuple.output));
    }
}
