use thiserror::Error;

/// Recoverable reasons for a mutation to not take place.
///
/// A genome that cannot perform the selected mutation simply stays unchanged
/// for this generation; none of these variants abort a run.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MutationError {
    #[error("No enabled connection gene available to split.")]
    NoEnabledConnection,
    #[error("No new connection between two field genes is possible.")]
    NoConnectionPossible,
    #[error("The genome holds no field genes.")]
    NoFieldGene,
    #[error("The genome holds no connection genes.")]
    NoConnectionGene,
}
