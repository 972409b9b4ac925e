//! Activation error types

use thiserror::Error;

use crate::filter::FilterError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    /// Startup was aborted and the host control returned instead of exiting
    #[error("{message}")]
    StartupAborted { message: String },

    #[error("Failed to install sensitive-value filter: {0}")]
    Filter(#[from] FilterError),
}

pub type ActivationResult<T> = Result<T, ActivationError>;
