use serde::{Deserialize, Serialize};

use crate::{
    parameters::{KernelChances, Ranges},
    rng::EngineRng,
};

/// Interaction profile carried by every gene.
///
/// A kernel maps the output of one field onto the input of another (or onto
/// its own field for self-kernels). The variants mirror the kernel elements
/// of the simulator; genes own plain parameter values and hand out copies
/// when a phenotype is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    Gauss {
        width: f64,
        amplitude: f64,
        amplitude_global: f64,
    },
    MexicanHat {
        width_exc: f64,
        amplitude_exc: f64,
        width_inh: f64,
        amplitude_inh: f64,
        amplitude_global: f64,
    },
    Oscillatory {
        amplitude: f64,
        decay: f64,
        zero_crossings: f64,
        amplitude_global: f64,
    },
}

impl Kernel {
    /// Draws a kernel variant by the configured chances with a positive
    /// amplitude, suitable for field self-kernels.
    pub fn sample(rng: &mut EngineRng, chances: &KernelChances, ranges: &Ranges) -> Self {
        let roll = rng.in_range(0.0, 1.0);

        if roll < chances.gauss {
            Kernel::Gauss {
                width: ranges.gauss.width.sample(rng),
                amplitude: ranges.gauss.amplitude.sample(rng),
                amplitude_global: ranges.gauss.amplitude_global.sample(rng),
            }
        } else if roll < chances.gauss + chances.mexican_hat {
            Kernel::MexicanHat {
                width_exc: ranges.mexican_hat.width_exc.sample(rng),
                amplitude_exc: ranges.mexican_hat.amplitude_exc.sample(rng),
                width_inh: ranges.mexican_hat.width_inh.sample(rng),
                amplitude_inh: ranges.mexican_hat.amplitude_inh.sample(rng),
                amplitude_global: ranges.mexican_hat.amplitude_global.sample(rng),
            }
        } else {
            Kernel::Oscillatory {
                amplitude: ranges.oscillatory.amplitude.sample(rng),
                decay: ranges.oscillatory.decay.sample(rng),
                zero_crossings: ranges.oscillatory.zero_crossings.sample(rng),
                amplitude_global: ranges.oscillatory.amplitude_global.sample(rng),
            }
        }
    }

    /// Like [`Kernel::sample`] but with a uniformly random amplitude sign and
    /// no global component, suitable for connection kernels.
    pub fn sample_signed(rng: &mut EngineRng, chances: &KernelChances, ranges: &Ranges) -> Self {
        let sign = rng.sign();
        let mut kernel = Self::sample(rng, chances, ranges);

        match &mut kernel {
            Kernel::Gauss {
                amplitude,
                amplitude_global,
                ..
            } => {
                *amplitude *= sign;
                *amplitude_global = 0.0;
            }
            Kernel::MexicanHat {
                amplitude_exc,
                amplitude_global,
                ..
            } => {
                *amplitude_exc *= sign;
                *amplitude_global = 0.0;
            }
            Kernel::Oscillatory {
                amplitude,
                amplitude_global,
                ..
            } => {
                *amplitude *= sign;
                *amplitude_global = 0.0;
            }
        }

        kernel
    }

    /// Steps one uniformly chosen parameter of the active variant by its
    /// configured step size, clamped into bounds. The sign of the leading
    /// amplitude survives the mutation.
    pub fn mutate_parameter(&mut self, rng: &mut EngineRng, ranges: &Ranges) {
        match self {
            Kernel::Gauss {
                width,
                amplitude,
                amplitude_global,
            } => match rng.index(3) {
                0 => *width = ranges.gauss.width.nudge(*width, rng),
                1 => *amplitude = ranges.gauss.amplitude.nudge_signed(*amplitude, rng),
                _ => {
                    *amplitude_global = ranges.gauss.amplitude_global.nudge(*amplitude_global, rng)
                }
            },
            Kernel::MexicanHat {
                width_exc,
                amplitude_exc,
                width_inh,
                amplitude_inh,
                amplitude_global,
            } => match rng.index(5) {
                0 => *width_exc = ranges.mexican_hat.width_exc.nudge(*width_exc, rng),
                1 => {
                    *amplitude_exc = ranges
                        .mexican_hat
                        .amplitude_exc
                        .nudge_signed(*amplitude_exc, rng)
                }
                2 => *width_inh = ranges.mexican_hat.width_inh.nudge(*width_inh, rng),
                3 => *amplitude_inh = ranges.mexican_hat.amplitude_inh.nudge(*amplitude_inh, rng),
                _ => {
                    *amplitude_global = ranges
                        .mexican_hat
                        .amplitude_global
                        .nudge(*amplitude_global, rng)
                }
            },
            Kernel::Oscillatory {
                amplitude,
                decay,
                zero_crossings,
                amplitude_global,
            } => match rng.index(4) {
                0 => *amplitude = ranges.oscillatory.amplitude.nudge_signed(*amplitude, rng),
                1 => *decay = ranges.oscillatory.decay.nudge(*decay, rng),
                2 => {
                    *zero_crossings = ranges
                        .oscillatory
                        .zero_crossings
                        .nudge(*zero_crossings, rng)
                }
                _ => {
                    *amplitude_global = ranges
                        .oscillatory
                        .amplitude_global
                        .nudge(*amplitude_global, rng)
                }
            },
        }
    }

    /// Negates the leading amplitude, turning an excitatory connection
    /// inhibitory and vice versa.
    pub fn flip_amplitude(&mut self) {
        match self {
            Kernel::Gauss { amplitude, .. } => *amplitude = -*amplitude,
            Kernel::MexicanHat { amplitude_exc, .. } => *amplitude_exc = -*amplitude_exc,
            Kernel::Oscillatory { amplitude, .. } => *amplitude = -*amplitude,
        }
    }

    /// The leading amplitude of the variant.
    pub fn amplitude(&self) -> f64 {
        match *self {
            Kernel::Gauss { amplitude, .. } => amplitude,
            Kernel::MexicanHat { amplitude_exc, .. } => amplitude_exc,
            Kernel::Oscillatory { amplitude, .. } => amplitude,
        }
    }

    /// The width-like parameter of the variant.
    pub fn width(&self) -> f64 {
        match *self {
            Kernel::Gauss { width, .. } => width,
            Kernel::MexicanHat { width_exc, .. } => width_exc,
            Kernel::Oscillatory { decay, .. } => decay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Kernel;
    use crate::{parameters::Parameters, rng::EngineRng};

    #[test]
    fn self_kernels_start_excitatory() {
        let parameters = Parameters::default();
        let mut rng = EngineRng::new(42);

        for _ in 0..100 {
            let kernel = Kernel::sample(&mut rng, &parameters.kernels, &parameters.ranges);
            assert!(kernel.amplitude() >= 0.0);
        }
    }

    #[test]
    fn connection_kernels_have_no_global_component() {
        let parameters = Parameters::default();
        let mut rng = EngineRng::new(42);

        for _ in 0..100 {
            let kernel = Kernel::sample_signed(&mut rng, &parameters.kernels, &parameters.ranges);
            let global = match kernel {
                Kernel::Gauss {
                    amplitude_global, ..
                }
                | Kernel::MexicanHat {
                    amplitude_global, ..
                }
                | Kernel::Oscillatory {
                    amplitude_global, ..
                } => amplitude_global,
            };
            assert_eq!(global, 0.0);
        }
    }

    #[test]
    fn parameter_mutation_preserves_amplitude_sign() {
        let parameters = Parameters::default();
        let mut rng = EngineRng::new(42);

        let mut kernel = Kernel::Gauss {
            width: 5.0,
            amplitude: -2.0,
            amplitude_global: -0.5,
        };

        for _ in 0..1000 {
            kernel.mutate_parameter(&mut rng, &parameters.ranges);
            assert!(kernel.amplitude() <= 0.0);
        }
    }

    #[test]
    fn flip_amplitude_is_involutive() {
        let mut kernel = Kernel::Oscillatory {
            amplitude: 1.5,
            decay: 0.8,
            zero_crossings: 3.0,
            amplitude_global: 0.0,
        };
        let original = kernel.clone();

        kernel.flip_amplitude();
        assert_eq!(kernel.amplitude(), -1.5);

        kernel.flip_amplitude();
        assert_eq!(kernel, original);
    }
}
