//! Resolution of the runtime dependency paths.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use crate::defaults::{RIPPLE_COMPILER_PATH_ENV, TSDK_PATH_ENV};
use crate::environment::EnvironmentSnapshot;
use crate::error::ConfigError;
use crate::options::InitializationOptions;

/// Runtime dependency the server cannot start without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    /// The Ripple compiler module.
    RipplePath,
    /// The TypeScript SDK installation.
    TypeScriptSdk,
}

impl RequiredField {
    /// Fully-qualified option name reported back to the client.
    #[must_use]
    pub const fn option_name(self) -> &'static str {
        match self {
            Self::RipplePath => "initializationOptions.ripplePath",
            Self::TypeScriptSdk => "initializationOptions.typescript.tsdk",
        }
    }

    /// Environment variable consulted when the option is absent.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::RipplePath => RIPPLE_COMPILER_PATH_ENV,
            Self::TypeScriptSdk => TSDK_PATH_ENV,
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.option_name())
    }
}

/// Where a resolved path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    /// Supplied in `initializationOptions`.
    InitializationOptions,
    /// Taken from the environment fallback.
    Environment,
}

impl fmt::Display for PathSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InitializationOptions => "initializationOptions",
            Self::Environment => "environment",
        };
        formatter.write_str(label)
    }
}

/// A dependency path together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: Utf8PathBuf,
    source: PathSource,
}

impl ResolvedPath {
    /// Path as supplied; relative paths are interpreted by the module loader.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        self.path.as_path()
    }

    /// Source the path was taken from.
    #[must_use]
    pub const fn source(&self) -> PathSource {
        self.source
    }
}

/// Both runtime dependency paths, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    ripple: ResolvedPath,
    tsdk: ResolvedPath,
}

impl ResolvedPaths {
    /// Location of the Ripple compiler module.
    #[must_use]
    pub const fn ripple(&self) -> &ResolvedPath {
        &self.ripple
    }

    /// Location of the TypeScript SDK.
    #[must_use]
    pub const fn tsdk(&self) -> &ResolvedPath {
        &self.tsdk
    }
}

/// Resolves the compiler and SDK paths.
///
/// The option value wins whenever it is present and non-empty; the
/// environment snapshot is only consulted otherwise. The compiler path is
/// resolved first, so a request missing both reports the compiler.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] naming the first dependency that
/// neither source provides.
pub fn resolve(
    options: &InitializationOptions,
    env: &EnvironmentSnapshot,
) -> Result<ResolvedPaths, ConfigError> {
    let ripple = resolve_field(RequiredField::RipplePath, options.ripple_path(), env)?;
    let tsdk = resolve_field(RequiredField::TypeScriptSdk, options.tsdk(), env)?;
    Ok(ResolvedPaths { ripple, tsdk })
}

fn resolve_field(
    field: RequiredField,
    option: Option<&str>,
    env: &EnvironmentSnapshot,
) -> Result<ResolvedPath, ConfigError> {
    if let Some(value) = option {
        return Ok(ResolvedPath {
            path: Utf8PathBuf::from(value),
            source: PathSource::InitializationOptions,
        });
    }

    env.non_empty(field.env_var())
        .map(|value| ResolvedPath {
            path: Utf8PathBuf::from(value),
            source: PathSource::Environment,
        })
        .ok_or(ConfigError::missing(field))
}
