use serde::{Deserialize, Serialize};

use crate::{parameters::MutationChances, rng::EngineRng};

pub use self::error::MutationError;

pub type MutationResult = Result<(), MutationError>;

mod add_connection;
mod add_field;
mod error;
mod mutate_connection;
mod mutate_field;
mod toggle_connection;

/// The five mutually exclusive genome mutations.
///
/// [`Genome::mutate`] selects exactly one of them per call, weighted by the
/// configured [`MutationChances`]; the operations themselves live as
/// associated functions in this module, one file each.
///
/// [`Genome::mutate`]: crate::Genome::mutate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    AddField,
    MutateField,
    AddConnection,
    MutateConnection,
    ToggleConnection,
}

impl Mutation {
    /// Draws one mutation according to the configured chances.
    ///
    /// The chances are validated to sum to 1 when the engine is built, so the
    /// cumulative walk below always terminates in a variant.
    pub fn select(rng: &mut EngineRng, chances: &MutationChances) -> Self {
        let roll = rng.in_range(0.0, 1.0);

        let mut cumulative = chances.add_field;
        if roll < cumulative {
            return Mutation::AddField;
        }
        cumulative += chances.mutate_field;
        if roll < cumulative {
            return Mutation::MutateField;
        }
        cumulative += chances.add_connection;
        if roll < cumulative {
            return Mutation::AddConnection;
        }
        cumulative += chances.mutate_connection;
        if roll < cumulative {
            return Mutation::MutateConnection;
        }
        Mutation::ToggleConnection
    }
}
