use serde::{Deserialize, Serialize};

use crate::{genome::Genome, mutations::Mutation, rng::EngineRng, Engine};

/// Fitness differences below this are treated as a tie during crossover.
pub const FITNESS_TIE_TOLERANCE: f64 = 1e-6;

/// Scalar state of a candidate, updated by the population each generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionParameters {
    pub fitness: f64,
    pub adjusted_fitness: f64,
    pub reproduction_probability: f64,
    pub age: usize,
}

/// One candidate architecture of the population.
///
/// A solution owns its genome and scalar parameters only. Phenotypes are
/// built on demand by the evaluation hook through [`crate::phenotype::build`]
/// and never stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Solution {
    pub genome: Genome,
    pub parameters: SolutionParameters,
}

impl Solution {
    pub fn with_genome(genome: Genome) -> Self {
        Self {
            genome,
            parameters: SolutionParameters::default(),
        }
    }

    /// Creates the configured input, output and hidden field genes and
    /// connects each input-output pair with the configured chance.
    ///
    /// Initial connections run through the innovation registry, so all clones
    /// of one seed agree on the numbers of their shared topology.
    pub fn initialize(&mut self, engine: &mut Engine) {
        let inputs = engine.parameters.structure.inputs;
        let outputs = engine.parameters.structure.outputs;
        let hidden = engine.parameters.structure.hidden;
        let connection_chance = engine.parameters.structure.connection_chance;

        let mut input_ids = Vec::with_capacity(inputs);
        for _ in 0..inputs {
            input_ids.push(
                self.genome
                    .add_input_gene(&mut engine.rng, &engine.parameters),
            );
        }

        let mut output_ids = Vec::with_capacity(outputs);
        for _ in 0..outputs {
            output_ids.push(
                self.genome
                    .add_output_gene(&mut engine.rng, &engine.parameters),
            );
        }

        for _ in 0..hidden {
            self.genome
                .add_hidden_gene(&mut engine.rng, &engine.parameters);
        }

        for &input in &input_ids {
            for &output in &output_ids {
                if engine.rng.gamble(connection_chance) {
                    self.genome.connect(input, output, engine);
                }
            }
        }
    }

    pub fn mutate(&mut self, engine: &mut Engine) -> Mutation {
        self.genome.mutate(engine)
    }

    pub fn fitness(&self) -> f64 {
        self.parameters.fitness
    }

    /// Stores the raw fitness reported by the evaluation hook, clamped into
    /// `[0, max_fitness]`.
    pub fn set_fitness(&mut self, raw: f64, max_fitness: f64) {
        self.parameters.fitness = raw.clamp(0.0, max_fitness);
    }

    pub fn increment_age(&mut self) {
        self.parameters.age += 1;
    }

    /// Recombines two parents into a fresh offspring.
    ///
    /// All field genes come from the more fit parent. Matching connection
    /// genes are inherited from either side with equal chance; disjoint and
    /// excess genes come from the more fit parent only, unless the fitness is
    /// tied, in which case every non-matching gene of either parent is
    /// included with probability one half (copying referenced field genes
    /// the offspring is still missing).
    pub fn crossover(&self, other: &Self, rng: &mut EngineRng) -> Solution {
        let tied = (self.fitness() - other.fitness()).abs() < FITNESS_TIE_TOLERANCE;
        let (more_fit, less_fit) = if self.fitness() > other.fitness() {
            (self, other)
        } else {
            (other, self)
        };

        let mut genome = Genome::default();

        for gene in &more_fit.genome.field_genes {
            genome.field_genes.push(gene.clone());
        }

        for gene in &more_fit.genome.connection_genes {
            if let Some(matching) = less_fit.genome.connection_by_innovation(gene.innovation) {
                let inherited = if rng.gamble(0.5) { gene } else { matching };
                genome.insert_connection_gene(inherited.clone());
            } else if !tied || rng.gamble(0.5) {
                genome.insert_connection_gene(gene.clone());
            }
        }

        if tied {
            for gene in &less_fit.genome.connection_genes {
                if more_fit.genome.contains_innovation(gene.innovation) {
                    continue;
                }
                if rng.gamble(0.5) {
                    for id in [gene.tuple.input, gene.tuple.output].iter() {
                        if let Some(field) = less_fit.genome.field_by_id(*id) {
                            genome.insert_field_gene(field.clone());
                        }
                    }
                    genome.insert_connection_gene(gene.clone());
                }
            }
        }

        Solution::with_genome(genome)
    }
}
