//! Genetic distance between genomes.
//!
//! Distance is measured on connection genes only: innovation numbers align
//! homologous genes, excess and disjoint counts capture topological
//! difference and matching genes contribute their kernel parameter
//! difference.

use crate::parameters::{Compatibility, DistanceCoefficients};

use super::Genome;

impl Genome {
    /// Number of innovation numbers in either genome strictly exceeding the
    /// highest innovation number of the other.
    ///
    /// An empty genome has no innovation horizon to exceed, so the count is
    /// zero and every gene of the other side is disjoint instead.
    pub fn excess(&self, other: &Genome) -> usize {
        let (max_self, max_other) = match (self.max_innovation(), other.max_innovation()) {
            (Some(max_self), Some(max_other)) => (max_self, max_other),
            _ => return 0,
        };

        self.innovations()
            .filter(|&innovation| innovation > max_other)
            .count()
            + other
                .innovations()
                .filter(|&innovation| innovation > max_self)
                .count()
    }

    /// Number of innovation numbers present in exactly one genome and not
    /// beyond the smaller of the two innovation horizons.
    pub fn disjoint(&self, other: &Genome) -> usize {
        let cutoff = match (self.max_innovation(), other.max_innovation()) {
            (Some(max_self), Some(max_other)) => max_self.min(max_other),
            (Some(max_self), None) => max_self,
            (None, Some(max_other)) => max_other,
            (None, None) => return 0,
        };

        self.innovations()
            .filter(|&innovation| innovation <= cutoff && !other.contains_innovation(innovation))
            .count()
            + other
                .innovations()
                .filter(|&innovation| {
                    innovation <= cutoff && !self.contains_innovation(innovation)
                })
                .count()
    }

    /// Weighted sum of amplitude and width differences over matching
    /// connection genes.
    pub fn average_connection_difference(
        &self,
        other: &Genome,
        coefficients: &DistanceCoefficients,
    ) -> f64 {
        let mut amplitude_difference = 0.0;
        let mut width_difference = 0.0;

        for gene in &self.connection_genes {
            if let Some(matching) = other.connection_by_innovation(gene.innovation) {
                amplitude_difference +=
                    (gene.kernel.amplitude() - matching.kernel.amplitude()).abs();
                width_difference += (gene.kernel.width() - matching.kernel.width()).abs();
            }
        }

        coefficients.c_amp * amplitude_difference + coefficients.c_width * width_difference
    }

    /// The NEAT compatibility distance
    /// `(c1 * excess + c2 * disjoint + c3 * parameter_difference) / N`
    /// with `N` the larger genome size, forced to 1 below the small-genome
    /// cutoff to avoid inflating distances of short genomes.
    pub fn compatibility_distance(
        genome_0: &Genome,
        genome_1: &Genome,
        compatibility: &Compatibility,
        coefficients: &DistanceCoefficients,
    ) -> f64 {
        let largest = genome_0.len().max(genome_1.len());
        let normalization = if largest < compatibility.small_genome_cutoff {
            1.0
        } else {
            largest as f64
        };

        let excess = compatibility.c1 * genome_0.excess(genome_1) as f64;
        let disjoint = compatibility.c2 * genome_0.disjoint(genome_1) as f64;
        let parameters =
            compatibility.c3 * genome_0.average_connection_difference(genome_1, coefficients);

        (excess + disjoint + parameters) / normalization
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        genes::{ConnectionGene, ConnectionTuple, FieldId, Innovation, Kernel},
        genome::Genome,
        parameters::{Compatibility, DistanceCoefficients},
    };

    fn gauss(width: f64, amplitude: f64) -> Kernel {
        Kernel::Gauss {
            width,
            amplitude,
            amplitude_global: 0.0,
        }
    }

    fn connection(innovation: u16, kernel: Kernel) -> ConnectionGene {
        ConnectionGene::with_kernel(
            ConnectionTuple::new(FieldId(1), FieldId(2)),
            Innovation(innovation),
            kernel,
        )
    }

    fn genome_with_innovations(innovations: &[u16]) -> Genome {
        Genome {
            connection_genes: innovations
                .iter()
                .map(|&innovation| connection(innovation, gauss(2.0, 1.0)))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_genomes_have_zero_distance() {
        let genome_0 = Genome::default();
        let genome_1 = Genome::default();

        let delta = Genome::compatibility_distance(
            &genome_0,
            &genome_1,
            &Compatibility::default(),
            &DistanceCoefficients::default(),
        );

        assert_eq!(delta, 0.0);
    }

    #[test]
    fn identical_genomes_have_zero_distance() {
        let genome_0 = genome_with_innovations(&[1, 2, 3]);
        let genome_1 = genome_0.clone();

        let delta = Genome::compatibility_distance(
            &genome_0,
            &genome_1,
            &Compatibility::default(),
            &DistanceCoefficients::default(),
        );

        assert_eq!(delta, 0.0);
    }

    #[test]
    fn genes_beyond_the_other_horizon_are_excess() {
        let genome_0 = genome_with_innovations(&[1, 2, 3]);
        let genome_1 = genome_with_innovations(&[1, 2, 3, 7, 8]);

        assert_eq!(genome_0.excess(&genome_1), 2);
        assert_eq!(genome_0.disjoint(&genome_1), 0);
    }

    #[test]
    fn genes_within_the_shared_horizon_are_disjoint() {
        let genome_0 = genome_with_innovations(&[1, 3, 5]);
        let genome_1 = genome_with_innovations(&[1, 2, 5]);

        assert_eq!(genome_0.disjoint(&genome_1), 2);
        assert_eq!(genome_0.excess(&genome_1), 0);
    }

    #[test]
    fn all_genes_of_one_side_are_disjoint_against_an_empty_genome() {
        // one genome without connections, one with five disjoint genes;
        // c2 * 5 = 2.0 stays below the threshold of 3.0
        let genome_0 = genome_with_innovations(&[]);
        let genome_1 = genome_with_innovations(&[1, 2, 3, 4, 5]);

        assert_eq!(genome_0.excess(&genome_1), 0);
        assert_eq!(genome_0.disjoint(&genome_1), 5);

        let compatibility = Compatibility::default();
        let delta = Genome::compatibility_distance(
            &genome_0,
            &genome_1,
            &compatibility,
            &DistanceCoefficients::default(),
        );

        assert!((delta - 2.0).abs() < f64::EPSILON);
        assert!(delta < compatibility.threshold);
    }

    #[test]
    fn matching_genes_contribute_parameter_differences() {
        let genome_0 = Genome {
            connection_genes: vec![connection(1, gauss(2.0, 1.0))],
            ..Default::default()
        };
        let genome_1 = Genome {
            connection_genes: vec![connection(1, gauss(4.0, -1.0))],
            ..Default::default()
        };

        let coefficients = DistanceCoefficients {
            c_amp: 0.5,
            c_width: 0.25,
        };

        // 0.5 * |1 - (-1)| + 0.25 * |2 - 4|
        let difference = genome_0.average_connection_difference(&genome_1, &coefficients);
        assert!((difference - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn large_genomes_normalize_by_size() {
        let innovations: Vec<u16> = (1..=25).collect();
        let genome_0 = genome_with_innovations(&innovations);
        let genome_1 = genome_with_innovations(&[]);

        let compatibility = Compatibility::default();
        let delta = Genome::compatibility_distance(
            &genome_0,
            &genome_1,
            &compatibility,
            &DistanceCoefficients::default(),
        );

        // 25 disjoint genes scaled by c2, normalized by N = 25
        assert!((delta - compatibility.c2).abs() < f64::EPSILON);
    }
}
