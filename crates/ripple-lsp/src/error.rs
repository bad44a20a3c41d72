//! Errors raised by the server binary.

use std::io;

use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;

/// Errors raised while framing messages.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading or writing the stream failed.
    #[error("transport I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The header block carried no `Content-Length`.
    #[error("message headers are missing Content-Length")]
    MissingContentLength,

    /// `Content-Length` was not a valid length.
    #[error("invalid Content-Length header: {value}")]
    InvalidHeader {
        /// Raw header value.
        value: String,
    },
}

/// Errors that stop the server loop.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An outgoing message could not be serialised.
    #[error("failed to encode outgoing message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Errors raised before the server loop starts or that end it.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Logging could not be configured.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The working directory could not be determined.
    #[error("failed to determine the working directory: {0}")]
    WorkingDirectory(#[source] io::Error),

    /// The server loop failed.
    #[error(transparent)]
    Server(#[from] ServerError),
}
