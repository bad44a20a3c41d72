//! Configuration surface for the Ripple language server.
//!
//! The server receives its configuration from three places: the process
//! arguments it was launched with, the `initializationOptions` payload of the
//! client's `initialize` request, and a handful of environment variables that
//! act as fallbacks for the latter. This crate models each source as an
//! immutable value and resolves the runtime dependency paths with a pure
//! function so that precedence rules can be tested without touching the
//! process environment.

mod defaults;
mod environment;
mod error;
mod launch;
mod logging;
mod options;
mod resolve;

pub use defaults::{
    DEFAULT_LOCALE, DEFAULT_LOG_FILTER, RIPPLE_COMPILER_PATH_ENV, SERVER_NAME, TSDK_PATH_ENV,
    default_log_filter, default_log_format,
};
pub use environment::EnvironmentSnapshot;
pub use error::ConfigError;
pub use launch::LaunchArgs;
pub use logging::{LogFormat, LogFormatParseError};
pub use options::{InitializationOptions, TypeScriptOptions};
pub use resolve::{PathSource, RequiredField, ResolvedPath, ResolvedPaths, resolve};
