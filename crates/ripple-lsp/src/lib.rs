//! Stdio language server for Ripple source files.
//!
//! The binary frames JSON-RPC messages over stdin and stdout, hands the
//! `initialize` handshake to [`ripple_lsp_host::Session`], and answers the
//! lifecycle requests the handshake needs. Logging goes to stderr so it never
//! interleaves with protocol traffic.

mod bootstrap;
mod error;
mod jsonrpc;
mod server;
mod telemetry;
mod transport;

pub use bootstrap::run;
pub use error::{BootstrapError, ServerError, TelemetryError, TransportError};
pub use jsonrpc::{ErrorCode, Message, OutgoingRequest, Response, ResponseError};
pub use server::{ExitReason, Server};
pub use telemetry::{TelemetryHandle, initialise as initialise_telemetry};
pub use transport::Transport;

/// `tracing` target used by the binary's own events.
pub const LOG_TARGET: &str = env!("CARGO_PKG_NAME");
