//! Error taxonomy for the generator.
//!
//! Every error is raised synchronously by the call that broke the contract
//! (`init`, `make`, or a generated setter). Nothing is retried.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by the factory and by generated components.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Missing or invalid dependency injection, or a second `init`.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Malformed namespace or field spec.
    #[error("Format error: {message}")]
    Format { message: String },

    /// A generated setter received more arguments than its field declares.
    #[error("Too many arguments for '{setter}': expected at most {expected}, got {got}")]
    Arity {
        setter: String,
        expected: usize,
        got: usize,
    },

    /// Operation attempted on a factory that is not ready.
    #[error("State error: {message}")]
    State { message: String },

    /// Configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FactoryError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        FactoryError::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        FactoryError::Format {
            message: message.into(),
        }
    }

    pub(crate) fn state(message: impl Into<String>) -> Self {
        FactoryError::State {
            message: message.into(),
        }
    }

    /// Short machine-readable tag for the error class.
    pub fn error_type(&self) -> &'static str {
        match self {
            FactoryError::Configuration { .. } => "configuration_error",
            FactoryError::Format { .. } => "format_error",
            FactoryError::Arity { .. } => "arity_error",
            FactoryError::State { .. } => "state_error",
            FactoryError::Config(_) => "config_error",
        }
    }
}
