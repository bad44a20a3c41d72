//! Process arguments accepted by the `ripple-lsp` binary.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::Parser;

use crate::defaults::{SERVER_NAME, default_log_filter, default_log_format};
use crate::logging::LogFormat;

/// Arguments supplied by the editor extension when spawning the server.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = SERVER_NAME, version, about = "Language server for Ripple source files")]
pub struct LaunchArgs {
    /// Directory holding the extension's `language.js` and `ts.js` modules.
    #[arg(long = "extRoot", value_name = "PATH")]
    pub ext_root: Option<Utf8PathBuf>,

    /// Communicate over stdio (the only supported transport).
    #[arg(long)]
    pub stdio: bool,

    /// Process id of the editor that launched the server.
    #[arg(long = "clientProcessId", value_name = "PID")]
    pub client_process_id: Option<u32>,

    /// `tracing` filter expression applied to stderr logging.
    #[arg(long, value_name = "EXPR", default_value = default_log_filter())]
    pub log_filter: String,

    /// Log output format.
    #[arg(long, value_name = "FORMAT", default_value_t = default_log_format())]
    pub log_format: LogFormat,
}

impl LaunchArgs {
    /// Parses arguments from an explicit iterator, the first item being the
    /// program name.
    ///
    /// # Errors
    ///
    /// Returns the `clap` error describing the invalid invocation.
    pub fn parse_from_iter<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }
}
