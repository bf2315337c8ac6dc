use std::{
    fmt,
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::mutations::Mutation;

/// How often each mutation kind was selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationCounts {
    pub add_field: usize,
    pub mutate_field: usize,
    pub add_connection: usize,
    pub mutate_connection: usize,
    pub toggle_connection: usize,
}

impl MutationCounts {
    pub fn record(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::AddField => self.add_field += 1,
            Mutation::MutateField => self.mutate_field += 1,
            Mutation::AddConnection => self.add_connection += 1,
            Mutation::MutateConnection => self.mutate_connection += 1,
            Mutation::ToggleConnection => self.toggle_connection += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.add_field
            + self.mutate_field
            + self.add_connection
            + self.mutate_connection
            + self.toggle_connection
    }
}

/// Summary of one finished generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStatistics {
    pub generation: usize,
    pub best_fitness: f64,
    pub average_fitness: f64,
    pub num_species: usize,
    pub num_solutions: usize,
    pub mutations: MutationCounts,
}

impl GenerationStatistics {
    /// Appends this record as one `key: value, ...` line to a text log.
    pub fn append_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", self)
    }
}

impl fmt::Display for GenerationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation: {}, best fitness: {}, average fitness: {}, species: {}, solutions: {}, \
             add field: {}, mutate field: {}, add connection: {}, mutate connection: {}, \
             toggle connection: {}",
            self.generation,
            self.best_fitness,
            self.average_fitness,
            self.num_species,
            self.num_solutions,
            self.mutations.add_field,
            self.mutations.mutate_field,
            self.mutations.add_connection,
            self.mutations.mutate_connection,
            self.mutations.toggle_connection,
        )
    }
}
