//! Entry point for the `ripple-lsp` binary.

use std::process::ExitCode;

use ripple_config::LaunchArgs;

fn main() -> ExitCode {
    let args = match LaunchArgs::parse_from_iter(std::env::args_os()) {
        Ok(args) => args,
        Err(error) => error.exit(),
    };
    match ripple_lsp::run(&args) {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(target: ripple_lsp::LOG_TARGET, %error, "ripple-lsp stopped");
            ExitCode::FAILURE
        }
    }
}
