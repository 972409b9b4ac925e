//! Startup and shutdown composition

mod error;
mod secrets_activator;

pub use error::{ActivationError, ActivationResult};
pub use secrets_activator::{SecretsActivator, SecretsActivatorBuilder};
