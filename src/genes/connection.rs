use std::fmt;

use serde::{Deserialize, Serialize};

use super::{FieldId, Innovation, Kernel};
use crate::{parameters::Parameters, rng::EngineRng};

/// Directed pair of field gene ids a connection runs between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionTuple {
    pub input: FieldId,
    pub output: FieldId,
}

impl ConnectionTuple {
    pub fn new(input: FieldId, output: FieldId) -> Self {
        Self { input, output }
    }
}

impl fmt::Display for ConnectionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.input.0, self.output.0)
    }
}

/// A directed, innovation-numbered kernel between two fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub tuple: ConnectionTuple,
    pub innovation: Innovation,
    pub enabled: bool,
    pub kernel: Kernel,
}

impl ConnectionGene {
    /// A fresh connection with a randomly drawn, possibly inhibitory kernel.
    pub fn new(
        tuple: ConnectionTuple,
        innovation: Innovation,
        rng: &mut EngineRng,
        parameters: &Parameters,
    ) -> Self {
        Self {
            tuple,
            innovation,
            enabled: true,
            kernel: Kernel::sample_signed(rng, &parameters.kernels, &parameters.ranges),
        }
    }

    /// A connection inheriting an existing kernel, used when a split
    /// connection passes its kernel on to its two replacements.
    pub fn with_kernel(tuple: ConnectionTuple, innovation: Innovation, kernel: Kernel) -> Self {
        Self {
            tuple,
            innovation,
            enabled: true,
            kernel,
        }
    }

    /// Three-way choice among stepping a kernel parameter, flipping the
    /// connection sign and re-drawing the kernel variant.
    pub fn mutate(&mut self, rng: &mut EngineRng, parameters: &Parameters) {
        let chances = &parameters.connection_gene;
        let roll = rng.in_range(0.0, 1.0);

        if roll < chances.mutate_kernel {
            self.kernel.mutate_parameter(rng, &parameters.ranges);
        } else if roll < chances.mutate_kernel + chances.mutate_signal {
            self.kernel.flip_amplitude();
        } else {
            self.kernel = Kernel::sample_signed(rng, &parameters.kernels, &parameters.ranges);
        }
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionGene, ConnectionTuple};
    use crate::{
        genes::{FieldId, Innovation},
        parameters::Parameters,
        rng::EngineRng,
    };

    fn connection() -> ConnectionGene {
        let parameters = Parameters::default();
        let mut rng = EngineRng::new(42);

        ConnectionGene::new(
            ConnectionTuple::new(FieldId(1), FieldId(2)),
            Innovation(1),
            &mut rng,
            &parameters,
        )
    }

    #[test]
    fn new_connections_start_enabled() {
        assert!(connection().enabled);
    }

    #[test]
    fn disable_then_toggle_restores_enabled() {
        let mut gene = connection();

        gene.disable();
        assert!(!gene.enabled);

        gene.toggle();
        assert!(gene.enabled);
    }

    #[test]
    fn clone_preserves_innovation_and_kernel() {
        let gene = connection();
        let copy = gene.clone();

        assert_eq!(copy.innovation, gene.innovation);
        assert_eq!(copy.tuple, gene.tuple);
        assert_eq!(copy.kernel, gene.kernel);
    }

    #[test]
    fn mutation_keeps_tuple_and_innovation() {
        let parameters = Parameters::default();
        let mut rng = EngineRng::new(42);
        let mut gene = connection();
        let tuple = gene.tuple;
        let innovation = gene.innovation;

        for _ in 0..1000 {
            gene.mutate(&mut rng, &parameters);
        }

        assert_eq!(gene.tuple, tuple);
        assert_eq!(gene.innovation, innovation);
    }
}
