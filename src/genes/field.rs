use serde::{Deserialize, Serialize};

use super::{FieldId, Kernel};
use crate::{parameters::Parameters, rng::EngineRng};

/// Role of a field gene within a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Input,
    Output,
    Hidden,
}

/// Threshold function applied to a field's activation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Heaviside { threshold: f64 },
    Sigmoid { x_shift: f64, steepness: f64 },
}

/// Dynamics of a neural field: time constant, resting level and the
/// activation function of the underlying differential equation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralFieldParams {
    pub tau: f64,
    pub resting_level: f64,
    pub activation: ActivationFunction,
}

impl NeuralFieldParams {
    /// Fixed constants or a uniform sample within bounds, depending on the
    /// configuration.
    pub fn new(rng: &mut EngineRng, parameters: &Parameters) -> Self {
        if parameters.structure.variable_field_params {
            Self {
                tau: parameters.ranges.tau.sample(rng),
                resting_level: parameters.ranges.resting_level.sample(rng),
                activation: parameters.structure.activation,
            }
        } else {
            Self {
                tau: parameters.structure.tau,
                resting_level: parameters.structure.resting_level,
                activation: parameters.structure.activation,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub amplitude: f64,
}

/// A neural field node of the architecture.
///
/// Every field gene owns exactly one self-kernel and a noise parameter set;
/// the field and self-kernel are handed to the simulator as copies when a
/// phenotype is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGene {
    pub id: FieldId,
    pub kind: FieldKind,
    pub field: NeuralFieldParams,
    pub self_kernel: Kernel,
    pub noise: NoiseParams,
}

impl FieldGene {
    pub fn new(id: FieldId, kind: FieldKind, rng: &mut EngineRng, parameters: &Parameters) -> Self {
        Self {
            id,
            kind,
            field: NeuralFieldParams::new(rng, parameters),
            self_kernel: Kernel::sample(rng, &parameters.kernels, &parameters.ranges),
            noise: NoiseParams {
                amplitude: parameters.structure.noise_amplitude,
            },
        }
    }

    /// Three-way choice among stepping a kernel parameter, changing the field
    /// dynamics and re-drawing the kernel variant.
    pub fn mutate(&mut self, rng: &mut EngineRng, parameters: &Parameters) {
        let chances = &parameters.field_gene;
        let roll = rng.in_range(0.0, 1.0);

        if roll < chances.mutate_kernel {
            self.self_kernel.mutate_parameter(rng, &parameters.ranges);
        } else if roll < chances.mutate_kernel + chances.mutate_neural_field {
            self.mutate_neural_field(rng, parameters);
        } else {
            self.self_kernel = Kernel::sample(rng, &parameters.kernels, &parameters.ranges);
        }
    }

    // tau step, resting level step or full re-initialization
    fn mutate_neural_field(&mut self, rng: &mut EngineRng, parameters: &Parameters) {
        match rng.index(3) {
            0 => self.field.tau = parameters.ranges.tau.nudge(self.field.tau, rng),
            1 => {
                self.field.resting_level = parameters
                    .ranges
                    .resting_level
                    .nudge(self.field.resting_level, rng)
            }
            _ => self.field = NeuralFieldParams::new(rng, parameters),
        }
    }
}
