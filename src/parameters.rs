use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{genes::ActivationFunction, rng::EngineRng};

/// Probability groups must sum to 1 within this tolerance.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Error, Debug, PartialEq)]
pub enum ParametersError {
    #[error("probabilities of group `{group}` sum to {total}, expected 1")]
    ProbabilitiesDoNotSumToOne { group: &'static str, total: f64 },
    #[error("range `{name}` is inverted: min {min} exceeds max {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("range `{name}` has a negative step")]
    NegativeStep { name: &'static str },
    #[error("population size must be greater than zero")]
    EmptyPopulation,
    #[error("number of generations must be greater than zero")]
    NoGenerations,
    #[error("kill ratio {0} is outside [0, 1]")]
    KillRatioOutOfBounds(f64),
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Parameters {
    pub seed: Option<u64>,
    pub structure: Structure,
    pub population: PopulationParameters,
    pub compatibility: Compatibility,
    pub mutation: MutationChances,
    pub field_gene: FieldGeneChances,
    pub connection_gene: ConnectionGeneChances,
    pub kernels: KernelChances,
    pub ranges: Ranges,
    pub distance: DistanceCoefficients,
    pub dimensions: FieldDimensions,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            seed: Some(42),
            structure: Structure::default(),
            population: PopulationParameters::default(),
            compatibility: Compatibility::default(),
            mutation: MutationChances::default(),
            field_gene: FieldGeneChances::default(),
            connection_gene: ConnectionGeneChances::default(),
            kernels: KernelChances::default(),
            ranges: Ranges::default(),
            distance: DistanceCoefficients::default(),
            dimensions: FieldDimensions::default(),
        }
    }
}

impl Parameters {
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let mut s = Config::new();

        // Start off by merging in the "default" configuration file
        s.merge(File::with_name(path))?;

        // You can deserialize (and thus freeze) the entire configuration as
        s.try_into()
    }

    /// Checks every probability group and parameter range.
    ///
    /// Called once when an [`crate::Engine`] is constructed; a failing
    /// configuration aborts the run there.
    pub fn validate(&self) -> Result<(), ParametersError> {
        self.mutation.validate()?;
        self.field_gene.validate()?;
        self.connection_gene.validate()?;
        self.kernels.validate()?;
        self.ranges.validate()?;
        self.population.validate()?;
        Ok(())
    }
}

fn check_unit_sum(group: &'static str, total: f64) -> Result<(), ParametersError> {
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        Err(ParametersError::ProbabilitiesDoNotSumToOne { group, total })
    } else {
        Ok(())
    }
}

/// Initial topology of every solution and the fixed neural field constants.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Structure {
    pub inputs: usize,
    pub outputs: usize,
    pub hidden: usize,
    /// Chance for each input-output pair to start connected.
    pub connection_chance: f64,
    /// Sample tau and resting level within their ranges instead of using the
    /// fixed values below.
    pub variable_field_params: bool,
    pub tau: f64,
    pub resting_level: f64,
    pub activation: ActivationFunction,
    pub noise_amplitude: f64,
}

impl Default for Structure {
    fn default() -> Self {
        Self {
            inputs: 1,
            outputs: 1,
            hidden: 0,
            connection_chance: 1.0,
            variable_field_params: false,
            tau: 25.0,
            resting_level: -10.0,
            activation: ActivationFunction::Heaviside { threshold: 0.0 },
            noise_amplitude: 0.2,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PopulationParameters {
    pub size: usize,
    pub num_generations: usize,
    pub target_fitness: f64,
    /// Fitness reported by the evaluation hook is clamped into [0, max_fitness].
    pub max_fitness: f64,
    /// Share of every species culled each generation.
    pub kill_ratio: f64,
}

impl PopulationParameters {
    fn validate(&self) -> Result<(), ParametersError> {
        if self.size == 0 {
            return Err(ParametersError::EmptyPopulation);
        }
        if self.num_generations == 0 {
            return Err(ParametersError::NoGenerations);
        }
        if !(0.0..=1.0).contains(&self.kill_ratio) {
            return Err(ParametersError::KillRatioOutOfBounds(self.kill_ratio));
        }
        Ok(())
    }
}

impl Default for PopulationParameters {
    fn default() -> Self {
        Self {
            size: 100,
            num_generations: 1000,
            target_fitness: 0.95,
            max_fitness: 1.0,
            kill_ratio: 0.9,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Compatibility {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    pub threshold: f64,
    /// Genomes smaller than this are compared with N = 1.
    pub small_genome_cutoff: usize,
}

impl Default for Compatibility {
    fn default() -> Self {
        Self {
            c1: 0.5,
            c2: 0.4,
            c3: 0.1,
            threshold: 3.0,
            small_genome_cutoff: 20,
        }
    }
}

/// Chances of the five genome mutations, see [`crate::mutations::Mutation`].
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MutationChances {
    pub add_field: f64,
    pub mutate_field: f64,
    pub add_connection: f64,
    pub mutate_connection: f64,
    pub toggle_connection: f64,
}

impl MutationChances {
    fn validate(&self) -> Result<(), ParametersError> {
        check_unit_sum(
            "mutation",
            self.add_field
                + self.mutate_field
                + self.add_connection
                + self.mutate_connection
                + self.toggle_connection,
        )
    }
}

impl Default for MutationChances {
    fn default() -> Self {
        Self {
            add_field: 0.05,
            mutate_field: 0.45,
            add_connection: 0.1,
            mutate_connection: 0.3,
            toggle_connection: 0.1,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FieldGeneChances {
    pub mutate_kernel: f64,
    pub mutate_neural_field: f64,
    pub mutate_kernel_type: f64,
}

impl FieldGeneChances {
    fn validate(&self) -> Result<(), ParametersError> {
        check_unit_sum(
            "field_gene",
            self.mutate_kernel + self.mutate_neural_field + self.mutate_kernel_type,
        )
    }
}

impl Default for FieldGeneChances {
    fn default() -> Self {
        Self {
            mutate_kernel: 0.45,
            mutate_neural_field: 0.45,
            mutate_kernel_type: 0.1,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ConnectionGeneChances {
    pub mutate_kernel: f64,
    pub mutate_signal: f64,
    pub mutate_kernel_type: f64,
}

impl ConnectionGeneChances {
    fn validate(&self) -> Result<(), ParametersError> {
        check_unit_sum(
            "connection_gene",
            self.mutate_kernel + self.mutate_signal + self.mutate_kernel_type,
        )
    }
}

impl Default for ConnectionGeneChances {
    fn default() -> Self {
        Self {
            mutate_kernel: 0.8,
            mutate_signal: 0.1,
            mutate_kernel_type: 0.1,
        }
    }
}

/// Chances of drawing each kernel variant when a kernel is (re)initialized.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct KernelChances {
    pub gauss: f64,
    pub mexican_hat: f64,
    pub oscillatory: f64,
}

impl KernelChances {
    fn validate(&self) -> Result<(), ParametersError> {
        check_unit_sum("kernels", self.gauss + self.mexican_hat + self.oscillatory)
    }
}

impl Default for KernelChances {
    fn default() -> Self {
        Self {
            gauss: 0.6,
            mexican_hat: 0.3,
            oscillatory: 0.1,
        }
    }
}

/// Closed interval with a mutation step size.
///
/// Amplitude ranges are magnitudes; the sign of an amplitude is carried by
/// the kernel and preserved across mutations.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn sample(&self, rng: &mut EngineRng) -> f64 {
        rng.in_range(self.min, self.max)
    }

    /// Steps `value` up or down and clamps it into the range.
    pub fn nudge(&self, value: f64, rng: &mut EngineRng) -> f64 {
        (value + self.step * rng.sign()).clamp(self.min, self.max)
    }

    /// Like [`ParamRange::nudge`] but treats the range as a magnitude,
    /// keeping the sign of `value`.
    pub fn nudge_signed(&self, value: f64, rng: &mut EngineRng) -> f64 {
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * (value.abs() + self.step * rng.sign()).clamp(self.min, self.max)
    }

    fn validate(&self, name: &'static str) -> Result<(), ParametersError> {
        if self.min > self.max {
            return Err(ParametersError::InvertedRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        if self.step < 0.0 {
            return Err(ParametersError::NegativeStep { name });
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Ranges {
    pub tau: ParamRange,
    pub resting_level: ParamRange,
    pub gauss: GaussRanges,
    pub mexican_hat: MexicanHatRanges,
    pub oscillatory: OscillatoryRanges,
}

impl Ranges {
    fn validate(&self) -> Result<(), ParametersError> {
        self.tau.validate("tau")?;
        self.resting_level.validate("resting_level")?;
        self.gauss.width.validate("gauss.width")?;
        self.gauss.amplitude.validate("gauss.amplitude")?;
        self.gauss.amplitude_global.validate("gauss.amplitude_global")?;
        self.mexican_hat.width_exc.validate("mexican_hat.width_exc")?;
        self.mexican_hat
            .amplitude_exc
            .validate("mexican_hat.amplitude_exc")?;
        self.mexican_hat.width_inh.validate("mexican_hat.width_inh")?;
        self.mexican_hat
            .amplitude_inh
            .validate("mexican_hat.amplitude_inh")?;
        self.mexican_hat
            .amplitude_global
            .validate("mexican_hat.amplitude_global")?;
        self.oscillatory.amplitude.validate("oscillatory.amplitude")?;
        self.oscillatory.decay.validate("oscillatory.decay")?;
        self.oscillatory
            .zero_crossings
            .validate("oscillatory.zero_crossings")?;
        self.oscillatory
            .amplitude_global
            .validate("oscillatory.amplitude_global")?;
        Ok(())
    }
}

impl Default for Ranges {
    fn default() -> Self {
        Self {
            tau: ParamRange::new(10.0, 40.0, 1.0),
            resting_level: ParamRange::new(-20.0, -1.0, 0.5),
            gauss: GaussRanges::default(),
            mexican_hat: MexicanHatRanges::default(),
            oscillatory: OscillatoryRanges::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GaussRanges {
    pub width: ParamRange,
    pub amplitude: ParamRange,
    pub amplitude_global: ParamRange,
}

impl Default for GaussRanges {
    fn default() -> Self {
        Self {
            width: ParamRange::new(0.0, 10.0, 0.5),
            amplitude: ParamRange::new(0.0, 10.0, 0.5),
            amplitude_global: ParamRange::new(-5.0, 0.0, 0.1),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MexicanHatRanges {
    pub width_exc: ParamRange,
    pub amplitude_exc: ParamRange,
    pub width_inh: ParamRange,
    pub amplitude_inh: ParamRange,
    pub amplitude_global: ParamRange,
}

impl Default for MexicanHatRanges {
    fn default() -> Self {
        Self {
            width_exc: ParamRange::new(0.0, 10.0, 0.5),
            amplitude_exc: ParamRange::new(0.0, 15.0, 0.5),
            width_inh: ParamRange::new(0.0, 15.0, 0.5),
            amplitude_inh: ParamRange::new(0.0, 15.0, 0.5),
            amplitude_global: ParamRange::new(-5.0, 0.0, 0.1),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OscillatoryRanges {
    pub amplitude: ParamRange,
    pub decay: ParamRange,
    pub zero_crossings: ParamRange,
    pub amplitude_global: ParamRange,
}

impl Default for OscillatoryRanges {
    fn default() -> Self {
        Self {
            amplitude: ParamRange::new(0.0, 10.0, 0.5),
            decay: ParamRange::new(0.0, 5.0, 0.25),
            zero_crossings: ParamRange::new(0.0, 10.0, 0.5),
            amplitude_global: ParamRange::new(-5.0, 0.0, 0.1),
        }
    }
}

/// Weights of the kernel parameter differences in the genetic distance.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DistanceCoefficients {
    pub c_amp: f64,
    pub c_width: f64,
}

impl Default for DistanceCoefficients {
    fn default() -> Self {
        Self {
            c_amp: 0.5,
            c_width: 0.5,
        }
    }
}

/// Spatial discretization shared by all fields of a phenotype.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct FieldDimensions {
    pub x_size: usize,
    pub dx: f64,
}

impl Default for FieldDimensions {
    fn default() -> Self {
        Self {
            x_size: 100,
            dx: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ParamRange, Parameters, ParametersError};
    use crate::rng::EngineRng;

    #[test]
    fn default_parameters_are_valid() {
        assert_eq!(Parameters::default().validate(), Ok(()));
    }

    #[test]
    fn detect_broken_probability_group() {
        let mut parameters = Parameters::default();
        parameters.mutation.add_field = 0.5;

        match parameters.validate() {
            Err(ParametersError::ProbabilitiesDoNotSumToOne { group, .. }) => {
                assert_eq!(group, "mutation")
            }
            other => panic!("expected probability error, got {:?}", other),
        }
    }

    #[test]
    fn detect_inverted_range() {
        let mut parameters = Parameters::default();
        parameters.ranges.tau = ParamRange::new(5.0, 1.0, 0.5);

        assert!(matches!(
            parameters.validate(),
            Err(ParametersError::InvertedRange { name: "tau", .. })
        ));
    }

    #[test]
    fn nudge_stays_in_bounds() {
        let mut rng = EngineRng::new(42);
        let range = ParamRange::new(0.0, 1.0, 0.3);

        let mut value = 0.5;
        for _ in 0..100 {
            value = range.nudge(value, &mut rng);
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn nudge_signed_keeps_sign() {
        let mut rng = EngineRng::new(42);
        let range = ParamRange::new(0.0, 10.0, 0.5);

        let mut value = -3.0;
        for _ in 0..100 {
            value = range.nudge_signed(value, &mut rng);
            assert!(value <= 0.0);
            assert!(value.abs() <= 10.0);
        }
    }
}
