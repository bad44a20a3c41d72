//! Configuration errors raised before any runtime dependency is loaded.

use thiserror::Error;

use crate::resolve::RequiredField;

/// Errors raised while validating client options or launch arguments.
///
/// Configuration errors are permanent for a session: the client has to
/// restart the server with corrected options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required path was absent from both the options and the environment.
    #[error("{field} is required")]
    MissingField {
        /// Field that could not be resolved.
        field: RequiredField,
    },

    /// The `initializationOptions` payload did not have the expected shape.
    #[error("initializationOptions is malformed: {message}")]
    InvalidOptions {
        /// Description of the shape mismatch.
        message: String,
    },

    /// The server was launched without `--extRoot`.
    #[error("--extRoot is required to locate the extension modules")]
    MissingExtensionRoot,
}

impl ConfigError {
    pub(crate) const fn missing(field: RequiredField) -> Self {
        Self::MissingField { field }
    }

    pub(crate) fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }
}
