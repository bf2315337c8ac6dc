//! Speciated neuroevolution of dynamic neural field (DNF) architectures.
//!
//! This crate evolves populations of neural field networks with a method
//! derived from [NEAT]. A [`Genome`] encodes fields ([`FieldGene`]) connected
//! by parameterized kernels ([`ConnectionGene`]); the [`Population`] mutates
//! topology and kernel parameters, groups compatible genomes into [`Species`]
//! via genetic distance, reproduces them with fitness-proportional crossover
//! and culls the least fit, generation after generation.
//!
//! The neural field simulator itself is an external collaborator: the engine
//! only translates genomes into simulator elements through
//! [`phenotype::build`] and consumes fitness values computed by a
//! task-defined evaluation hook.
//!
//! # Getting started
//!
//! An [`Engine`] scopes all run-wide state: the configuration, the random
//! source, the [`InnovationRegistry`] and the species id counter. Everything
//! that mutates a genome borrows the engine, so two runs never share state
//! and tests can instantiate as many engines as they like.
//!
//! The usual entry point is the [`Population`], which owns its engine:
//!
//! ```
//! use dnf_neat::{parameters::Parameters, Population};
//!
//! let mut parameters = Parameters::default();
//! parameters.structure.inputs = 2;
//! parameters.population.size = 10;
//! parameters.population.num_generations = 5;
//!
//! // the evaluation hook usually builds a phenotype and runs simulations;
//! // here smaller architectures simply score higher
//! let mut population = Population::new(
//!     parameters,
//!     Box::new(|genome| 1.0 / (1.0 + genome.len() as f64)),
//! );
//!
//! population.evolve();
//!
//! assert!(population.best_solution().is_some());
//! ```
//!
//! For finer control, operate on genomes directly:
//!
//! ```
//! use dnf_neat::{Engine, Genome};
//!
//! let mut engine = Engine::default();
//!
//! let mut genome = Genome::default();
//! let input = genome.add_input_gene(&mut engine.rng, &engine.parameters);
//! let output = genome.add_output_gene(&mut engine.rng, &engine.parameters);
//! genome.connect(input, output, &mut engine);
//!
//! genome.mutate(&mut engine);
//! ```
//!
//! [NEAT]: http://nn.cs.utexas.edu/downloads/papers/stanley.ec02.pdf

pub use genes::{
    ActivationFunction, ConnectionGene, ConnectionTuple, FieldGene, FieldId, FieldKind,
    Innovation, Kernel, NeuralFieldParams, NoiseParams, SpeciesId,
};
pub use genome::Genome;
pub use innovation::InnovationRegistry;
pub use mutations::{Mutation, MutationError, MutationResult};
pub use parameters::{Parameters, ParametersError};
pub use population::{EvaluationFunction, Population, PopulationControl};
pub use rng::EngineRng;
pub use solution::{Solution, SolutionParameters};
pub use species::Species;
pub use statistics::{GenerationStatistics, MutationCounts};

use genes::SpeciesIds;
use log::error;

pub mod genes;
mod genome;
mod innovation;
pub mod mutations;
pub mod parameters;
pub mod phenotype;
mod population;
mod rng;
mod solution;
mod species;
pub mod statistics;

/// Run-scoped state of one evolution.
///
/// Bundles the validated configuration, the random source, the innovation
/// registry and the species id counter. All run-wide counters live here
/// rather than in globals, so independent runs and tests never interfere.
///
/// # Panics
///
/// Constructing an engine from an invalid configuration (a probability group
/// not summing to 1, an inverted parameter range) is fatal and panics.
pub struct Engine {
    pub parameters: Parameters,
    pub rng: EngineRng,
    pub innovations: InnovationRegistry,
    pub species_ids: SpeciesIds,
}

impl Engine {
    pub fn new(parameters: Parameters) -> Self {
        if let Err(rejected) = parameters.validate() {
            error!("configuration rejected: {}", rejected);
            panic!("configuration rejected: {}", rejected);
        }

        let rng = match parameters.seed {
            Some(seed) => EngineRng::new(seed),
            None => EngineRng::from_entropy(),
        };

        Self {
            parameters,
            rng,
            innovations: InnovationRegistry::default(),
            species_ids: SpeciesIds::default(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}
