use thiserror::Error;

/// Errors surfaced by the solar-exposure engine.
///
/// All three kinds abort the analysis call; none are retried, since
/// retrying a deterministic geometric computation with unchanged inputs
/// cannot succeed.
#[derive(Debug, Error)]
pub enum SolarError {
    /// Malformed inputs, rejected before any build or dispatch work starts.
    #[error("input validation failed: {0}")]
    InputValidation(String),

    /// The acceleration structure could not be built from the scene.
    /// No partial structure is returned.
    #[error("acceleration structure build failed: {0}")]
    Build(String),

    /// Dispatch produced output that violates the engine contract.
    #[error("ray dispatch failed: {0}")]
    Dispatch(String),
}
