use thiserror::Error;

use kassavakt_config::ConfigError;
use kassavakt_core::{RequestError, StateError};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Fuzz bounds rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("Invariant violated at iteration {iteration}: {reason}")]
    InvariantViolated { iteration: usize, reason: String },

    #[error("Generated state rejected: {0}")]
    State(#[from] StateError),

    #[error("Request rejected: {0}")]
    Request(#[from] RequestError),

    #[error("State hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}
