//! Process start-up: logging, collaborators and the stdio loop.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use ripple_config::{EnvironmentSnapshot, LaunchArgs};
use ripple_lsp_host::{ExtensionRoot, FsModuleLoader, Session, TracingReporter};
use tracing::{info, warn};

use crate::error::BootstrapError;
use crate::server::Server;
use crate::telemetry;
use crate::transport::Transport;

const BOOTSTRAP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bootstrap");

/// Runs the server over stdio until the client exits.
///
/// A missing `--extRoot` does not stop start-up; the handshake reports it to
/// the client as a configuration error instead.
///
/// # Errors
///
/// Returns a [`BootstrapError`] when logging cannot be configured, the working
/// directory is unavailable, or the transport fails.
pub fn run(args: &LaunchArgs) -> Result<ExitCode, BootstrapError> {
    telemetry::initialise(&args.log_filter, args.log_format)?;
    info!(
        target: BOOTSTRAP_TARGET,
        version = env!("CARGO_PKG_VERSION"),
        ext_root = ?args.ext_root,
        client_process_id = ?args.client_process_id,
        "starting ripple-lsp"
    );
    if !args.stdio {
        warn!(target: BOOTSTRAP_TARGET, "--stdio not given; stdio is the only transport");
    }

    let loader = FsModuleLoader::from_current_dir().map_err(BootstrapError::WorkingDirectory)?;
    let session = Session::new(
        Arc::new(loader),
        Arc::new(ExtensionRoot::new(args.ext_root.clone())),
        Arc::new(TracingReporter),
        EnvironmentSnapshot::capture(),
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut server = Server::new(Transport::new(stdin.lock(), stdout.lock()), session);
    let reason = server.run()?;
    Ok(ExitCode::from(reason.code()))
}
