use std::collections::HashMap;

use crate::genes::{ConnectionTuple, Innovation, TupleHasher};

/// Historical marker bookkeeping for one evolution run.
///
/// Innovation numbers increase monotonically for the whole run. Within a
/// single generation, mutations in different genomes that produce the same
/// connection tuple must receive the same number, so allocated tuples are
/// cached until [`InnovationRegistry::clear_generation`] is called.
#[derive(Debug, Default)]
pub struct InnovationRegistry {
    counter: u16,
    generation: HashMap<ConnectionTuple, Innovation, TupleHasher>,
}

impl InnovationRegistry {
    /// Allocates the next run-wide innovation number without recording a tuple.
    pub fn next(&mut self) -> Innovation {
        self.counter += 1;
        Innovation(self.counter)
    }

    /// The innovation number for `tuple`, reusing the number of an identical
    /// tuple seen earlier this generation.
    pub fn innovation_for(&mut self, tuple: ConnectionTuple) -> Innovation {
        if let Some(&known) = self.generation.get(&tuple) {
            return known;
        }

        self.counter += 1;
        let fresh = Innovation(self.counter);
        self.generation.insert(tuple, fresh);
        fresh
    }

    /// Forgets the tuples of the finished generation; the run-wide counter
    /// keeps its value.
    pub fn clear_generation(&mut self) {
        self.generation.clear();
    }

    pub fn is_generation_empty(&self) -> bool {
        self.generation.is_empty()
    }

    /// Highest innovation number allocated so far.
    pub fn current(&self) -> u16 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::InnovationRegistry;
    use crate::genes::{ConnectionTuple, FieldId};

    #[test]
    fn innovation_numbers_are_monotonic() {
        let mut registry = InnovationRegistry::default();

        let first = registry.next();
        let second = registry.next();

        assert!(second > first);
    }

    #[test]
    fn same_tuple_reuses_number_within_generation() {
        let mut registry = InnovationRegistry::default();
        let tuple = ConnectionTuple::new(FieldId(2), FieldId(5));

        // two genomes mutate to add the same connection this generation
        let first = registry.innovation_for(tuple);
        let second = registry.innovation_for(tuple);

        assert_eq!(first, second);
    }

    #[test]
    fn same_tuple_gets_fresh_number_next_generation() {
        let mut registry = InnovationRegistry::default();
        let tuple = ConnectionTuple::new(FieldId(2), FieldId(5));

        let first = registry.innovation_for(tuple);
        registry.clear_generation();
        let second = registry.innovation_for(tuple);

        assert!(second > first);
    }

    #[test]
    fn distinct_tuples_get_distinct_numbers() {
        let mut registry = InnovationRegistry::default();

        let first = registry.innovation_for(ConnectionTuple::new(FieldId(1), FieldId(3)));
        let second = registry.innovation_for(ConnectionTuple::new(FieldId(3), FieldId(1)));

        assert_ne!(first, second);
    }

    #[test]
    fn clearing_keeps_the_counter() {
        let mut registry = InnovationRegistry::default();

        registry.innovation_for(ConnectionTuple::new(FieldId(1), FieldId(2)));
        let before = registry.current();
        registry.clear_generation();

        assert!(registry.is_generation_empty());
        assert_eq!(registry.current(), before);
    }
}
