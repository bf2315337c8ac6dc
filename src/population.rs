use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use log::info;
use rayon::prelude::*;

use crate::{
    genome::Genome,
    parameters::Parameters,
    rng::EngineRng,
    solution::Solution,
    species::Species,
    statistics::{GenerationStatistics, MutationCounts},
    Engine,
};

/// Task-defined fitness hook.
///
/// Receives a genome, typically builds a phenotype through
/// [`crate::phenotype::build`] against its own simulator, and returns the raw
/// fitness. Called in parallel for a whole generation, hence `Send + Sync`.
pub type EvaluationFunction = Box<dyn Fn(&Genome) -> f64 + Send + Sync>;

/// Flag pair checked between generations.
///
/// Shared with the caller through an [`Arc`], so a run can be paused or
/// stopped from another thread. There is no in-generation cancellation.
#[derive(Debug, Default)]
pub struct PopulationControl {
    paused: AtomicBool,
    stopped: AtomicBool,
}

impl PopulationControl {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn start(&self) {
        self.stopped.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// The population control loop.
///
/// Owns the engine state, all species and the evaluation hook and advances
/// the run one strictly sequenced generation at a time:
/// evaluate, speciate, reproduce and select, track the best solution,
/// bookkeeping.
pub struct Population {
    engine: Engine,
    species: Vec<Species>,
    best: Option<Solution>,
    generation: usize,
    statistics: GenerationStatistics,
    total_mutations: MutationCounts,
    control: Arc<PopulationControl>,
    evaluate: EvaluationFunction,
}

impl Population {
    /// Clones the seed topology `size` times into a single initial species.
    ///
    /// Every clone is initialized separately, so kernels differ while the id
    /// layout and the innovation numbers of the shared topology align.
    pub fn new(parameters: Parameters, evaluate: EvaluationFunction) -> Self {
        let mut engine = Engine::new(parameters);
        let size = engine.parameters.population.size;

        let mut members = Vec::with_capacity(size);
        for _ in 0..size {
            let mut solution = Solution::default();
            solution.initialize(&mut engine);
            members.push(solution);
        }

        let mut first_species = Species::new(engine.species_ids.next_id(), members[0].clone());
        for member in members {
            first_species.add(member);
        }

        Self {
            engine,
            species: vec![first_species],
            best: None,
            generation: 0,
            statistics: GenerationStatistics::default(),
            total_mutations: MutationCounts::default(),
            control: Arc::new(PopulationControl::default()),
            evaluate,
        }
    }

    /// Handle for pausing or stopping the run from another thread.
    pub fn control(&self) -> Arc<PopulationControl> {
        Arc::clone(&self.control)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn best_solution(&self) -> Option<&Solution> {
        self.best.as_ref()
    }

    pub fn current_generation(&self) -> usize {
        self.generation
    }

    pub fn statistics(&self) -> &GenerationStatistics {
        &self.statistics
    }

    /// Mutation tallies accumulated over the whole run.
    pub fn total_mutations(&self) -> &MutationCounts {
        &self.total_mutations
    }

    pub fn size(&self) -> usize {
        self.species.iter().map(Species::len).sum()
    }

    /// Runs generations until the target fitness is exceeded, the configured
    /// number of generations has passed or the control flags stop the run.
    pub fn evolve(&mut self) {
        while !self.control.is_stopped() {
            if self.control.is_paused() {
                thread::sleep(Duration::from_millis(50));
                continue;
            }

            self.evolutionary_step();

            if self.end_condition_met() {
                break;
            }
        }
    }

    /// One full generation.
    pub fn evolutionary_step(&mut self) {
        self.evaluate();
        self.speciate();
        self.reproduce_and_select();
        self.track_best_solution();
        self.upkeep();
    }

    // Solutions own their phenotypes and share no mutable state, so a whole
    // generation is scored in parallel.
    fn evaluate(&mut self) {
        let evaluate = &self.evaluate;
        let max_fitness = self.engine.parameters.population.max_fitness;

        self.species.par_iter_mut().for_each(|species| {
            species.members.par_iter_mut().for_each(|solution| {
                let raw = evaluate(&solution.genome);
                solution.set_fitness(raw, max_fitness);
            });
        });
    }

    /// Reassigns every solution to the first compatible species, creating new
    /// species for unmatched solutions and dropping species that end up empty.
    fn speciate(&mut self) {
        let solutions = self
            .species
            .iter_mut()
            .flat_map(|species| species.members.drain(..))
            .collect::<Vec<_>>();

        for solution in solutions {
            self.assign_to_species(solution);
        }

        self.species.retain(|species| !species.is_empty());
    }

    fn assign_to_species(&mut self, solution: Solution) {
        let parameters = &self.engine.parameters;

        if let Some(species) = self
            .species
            .iter_mut()
            .find(|species| species.is_compatible(&solution, parameters))
        {
            species.add(solution);
        } else {
            let mut species = Species::new(self.engine.species_ids.next_id(), solution.clone());
            species.add(solution);
            self.species.push(species);
        }
    }

    /// Fitness sharing, offspring generation and culling.
    ///
    /// The number of offspring equals the number of solutions culled, so the
    /// population size is restored exactly every generation. All mutations
    /// happen here, serially; the per-generation innovations are cleared once
    /// afterwards.
    fn reproduce_and_select(&mut self) {
        for species in &mut self.species {
            species.calculate_adjusted_fitness();
        }

        let total_adjusted: f64 = self
            .species
            .iter()
            .map(Species::total_adjusted_fitness)
            .sum();
        let population_size = self.size();
        for species in &mut self.species {
            for member in &mut species.members {
                member.parameters.reproduction_probability = if total_adjusted > 0.0 {
                    member.parameters.adjusted_fitness / total_adjusted
                } else {
                    1.0 / population_size as f64
                };
            }
        }

        let kill_ratio = self.engine.parameters.population.kill_ratio;
        let kill_counts = self
            .species
            .iter()
            .map(|species| species.kill_count(kill_ratio))
            .collect::<Vec<_>>();
        for (species, &count) in self.species.iter_mut().zip(&kill_counts) {
            species.offspring_count = count;
        }
        let num_offspring = kill_counts.iter().sum::<usize>();

        let mut offspring = self.spawn_offspring(num_offspring);

        let mut mutation_counts = MutationCounts::default();
        for child in &mut offspring {
            let mutation = child.mutate(&mut self.engine);
            mutation_counts.record(mutation);
            self.total_mutations.record(mutation);
        }
        self.statistics.mutations = mutation_counts;
        self.engine.innovations.clear_generation();

        for (species, count) in self.species.iter_mut().zip(kill_counts) {
            species.kill_least_fit(count);
        }

        for child in offspring {
            self.assign_to_species(child);
        }
        self.species.retain(|species| !species.is_empty());

        debug_assert_eq!(self.size(), self.engine.parameters.population.size);
        debug_assert!(self
            .species
            .iter()
            .flat_map(|species| species.members.iter())
            .all(|member| member.genome.duplicate_tuple().is_none()));
    }

    /// Produces offspring by fitness-proportional selection of two distinct
    /// parents over the whole population.
    fn spawn_offspring(&mut self, count: usize) -> Vec<Solution> {
        let parents = self
            .species
            .iter()
            .flat_map(|species| species.members.iter())
            .collect::<Vec<_>>();
        if parents.is_empty() {
            return Vec::new();
        }

        let mut cumulative = Vec::with_capacity(parents.len());
        let mut running = 0.0;
        for parent in &parents {
            running += parent.parameters.reproduction_probability;
            cumulative.push(running);
        }

        let rng = &mut self.engine.rng;
        let mut offspring = Vec::with_capacity(count);
        for _ in 0..count {
            let first = pick_parent(&cumulative, rng);
            let second = if parents.len() < 2 {
                first
            } else {
                let mut candidate = pick_parent(&cumulative, rng);
                let mut retries = 0;
                while candidate == first && retries < 32 {
                    candidate = pick_parent(&cumulative, rng);
                    retries += 1;
                }
                if candidate == first {
                    // probability mass sits on a single parent; force a distinct mate
                    (first + 1) % parents.len()
                } else {
                    candidate
                }
            };

            offspring.push(parents[first].crossover(parents[second], rng));
        }

        offspring
    }

    /// Keeps a copy of the best solution seen so far; never regresses.
    fn track_best_solution(&mut self) {
        for species in &self.species {
            for member in &species.members {
                let improved = self
                    .best
                    .as_ref()
                    .map_or(true, |best| member.fitness() > best.fitness());
                if improved {
                    self.best = Some(member.clone());
                }
            }
        }
    }

    fn upkeep(&mut self) {
        for species in &mut self.species {
            species.update_representative();
            for member in &mut species.members {
                member.increment_age();
            }
        }
        self.generation += 1;

        let num_solutions = self.size();
        let total_fitness: f64 = self
            .species
            .iter()
            .flat_map(|species| species.members.iter())
            .map(Solution::fitness)
            .sum();

        self.statistics.generation = self.generation;
        self.statistics.best_fitness = self.best.as_ref().map_or(0.0, Solution::fitness);
        self.statistics.average_fitness = if num_solutions > 0 {
            total_fitness / num_solutions as f64
        } else {
            0.0
        };
        self.statistics.num_species = self.species.len();
        self.statistics.num_solutions = num_solutions;

        info!("{}", self.statistics);
    }

    fn end_condition_met(&self) -> bool {
        let target_reached = self.best.as_ref().map_or(false, |best| {
            best.fitness() > self.engine.parameters.population.target_fitness
        });

        target_reached || self.generation > self.engine.parameters.population.num_generations
    }
}

fn pick_parent(cumulative: &[f64], rng: &mut EngineRng) -> usize {
    let total = *cumulative.last().expect("no cumulative probabilities");
    let roll = rng.in_range(0.0, total);

    cumulative
        .partition_point(|&bound| bound < roll)
        .min(cumulative.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::Population;
    use crate::parameters::Parameters;

    fn random_fitness_population(size: usize, num_generations: usize) -> Population {
        let mut parameters = Parameters::default();
        parameters.structure.inputs = 2;
        parameters.structure.outputs = 1;
        parameters.population.size = size;
        parameters.population.num_generations = num_generations;
        parameters.population.target_fitness = 2.0;

        Population::new(parameters, Box::new(|_| rand::random::<f64>()))
    }

    #[test]
    fn initial_population_forms_one_species() {
        let population = random_fitness_population(10, 10);

        assert_eq!(population.species().len(), 1);
        assert_eq!(population.size(), 10);
    }

    #[test]
    fn population_size_is_restored_every_generation() {
        let mut population = random_fitness_population(10, 100);

        for _ in 0..10 {
            population.evolutionary_step();
            assert_eq!(population.size(), 10);
        }
    }

    #[test]
    fn nine_of_ten_solutions_are_replaced_per_generation() {
        let mut parameters = Parameters::default();
        parameters.structure.inputs = 2;
        parameters.structure.outputs = 1;
        parameters.population.size = 10;
        parameters.population.num_generations = 100;
        parameters.population.target_fitness = 2.0;
        // keep everything in one species so the whole cull lands there
        parameters.compatibility.threshold = 1000.0;

        let mut population = Population::new(parameters, Box::new(|_| rand::random::<f64>()));
        population.evolutionary_step();

        // every offspring is mutated exactly once, so the mutation tally
        // equals the offspring count of floor(10 * 0.9)
        assert_eq!(population.statistics().mutations.total(), 9);
        assert_eq!(population.size(), 10);
    }

    #[test]
    fn generational_innovations_are_cleared_every_generation() {
        let mut population = random_fitness_population(10, 100);

        for _ in 0..5 {
            population.evolutionary_step();
            assert!(population.engine().innovations.is_generation_empty());
        }
    }

    #[test]
    fn best_fitness_never_regresses() {
        let mut population = random_fitness_population(20, 200);
        let mut previous_best = 0.0;

        for _ in 0..100 {
            population.evolutionary_step();
            let best = population
                .best_solution()
                .map(|solution| solution.fitness())
                .unwrap();
            assert!(best >= previous_best);
            previous_best = best;
        }
    }

    #[test]
    fn evolve_halts_after_the_configured_generations() {
        let mut parameters = Parameters::default();
        parameters.structure.inputs = 1;
        parameters.structure.outputs = 1;
        parameters.population.size = 5;
        parameters.population.num_generations = 1;
        parameters.population.target_fitness = 0.5;

        let mut population = Population::new(parameters, Box::new(|_| rand::random::<f64>()));
        population.evolve();

        let generation = population.current_generation();
        assert!(generation >= 1 && generation <= 2, "ran {} generations", generation);
    }

    #[test]
    fn stopped_control_flag_halts_the_run() {
        let mut population = random_fitness_population(5, 100);

        population.control().stop();
        population.evolve();

        assert_eq!(population.current_generation(), 0);
    }

    #[test]
    fn every_solution_belongs_to_exactly_one_species() {
        let mut population = random_fitness_population(15, 100);

        for _ in 0..5 {
            population.evolutionary_step();
            let members: usize = population.species().iter().map(|s| s.len()).sum();
            assert_eq!(members, population.size());
            assert!(population.species().iter().all(|s| !s.is_empty()));
        }
    }
}
