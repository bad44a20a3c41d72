//! Error types surfaced while composing the server.

use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ripple_config::ConfigError;
use thiserror::Error;

/// Lifecycle state of a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection established, no `initialize` request seen yet.
    Uninitialized,
    /// Resolving dependency paths from options and environment.
    Resolving,
    /// Loading the extension modules, compiler, and SDK.
    Loading,
    /// Building the project service and service plugin list.
    Composing,
    /// Composition succeeded; the runtime owns request dispatch.
    Ready,
    /// Composition failed; the session is unusable.
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Resolving => "resolving",
            Self::Loading => "loading",
            Self::Composing => "composing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        formatter.write_str(label)
    }
}

/// Collaborator a load error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTarget {
    /// The Ripple compiler module.
    RippleCompiler,
    /// The TypeScript SDK.
    TypeScriptSdk,
    /// An extension module under `--extRoot`.
    Extension(&'static str),
}

impl fmt::Display for LoadTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RippleCompiler => formatter.write_str("Ripple compiler"),
            Self::TypeScriptSdk => formatter.write_str("TypeScript SDK"),
            Self::Extension(module) => write!(formatter, "extension module '{module}'"),
        }
    }
}

/// Errors raised by a [`crate::ModuleLoader`].
///
/// I/O errors are wrapped in `Arc` so the error stays cheap to clone and
/// small enough to return by value.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// Nothing exists at the module path.
    #[error("module '{path}' was not found")]
    NotFound {
        /// Path that was looked up.
        path: Utf8PathBuf,
    },

    /// The module exists but could not be read.
    #[error("failed to read module '{path}': {source}")]
    Io {
        /// Path being read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The module content did not have the expected structure.
    #[error("module '{path}' is malformed: {message}")]
    Malformed {
        /// Path of the malformed module.
        path: Utf8PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// The module version is not supported.
    #[error("module '{path}' is incompatible: {message}")]
    Incompatible {
        /// Path of the incompatible module.
        path: Utf8PathBuf,
        /// Description of the incompatibility.
        message: String,
    },
}

impl LoadError {
    /// Returns `true` when the module simply does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while merging plugin sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// Two service plugins share the same identity.
    #[error("service plugin '{id}' is registered more than once")]
    DuplicatePlugin {
        /// Identity claimed twice.
        id: String,
    },

    /// A collaborator factory refused to produce its plugin.
    #[error("{factory} failed: {message}")]
    Factory {
        /// Factory that failed.
        factory: &'static str,
        /// Description of the failure.
        message: String,
    },
}

impl CompositionError {
    /// Builds a factory failure.
    #[must_use]
    pub fn factory(factory: &'static str, message: impl Into<String>) -> Self {
        Self::Factory {
            factory,
            message: message.into(),
        }
    }
}

/// Errors returned by [`crate::Session`].
#[derive(Debug, Error)]
pub enum InitializeError {
    /// Required configuration was missing or malformed.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// A collaborator module failed to load.
    #[error("failed to load {target}: {source}")]
    Load {
        /// Collaborator being loaded.
        target: LoadTarget,
        /// Underlying loader error.
        #[source]
        source: LoadError,
    },

    /// Merging the plugin sets failed.
    #[error("failed to compose service plugins: {source}")]
    Composition {
        /// Underlying composition error.
        #[from]
        source: CompositionError,
    },

    /// A second `initialize` request arrived for the same session.
    #[error("initialize was already requested; session is {state}")]
    AlreadyInitialized {
        /// State the session was in.
        state: SessionState,
    },

    /// A post-handshake operation arrived before the session was ready.
    #[error("session is {state}, not ready")]
    NotReady {
        /// State the session was in.
        state: SessionState,
    },
}

impl InitializeError {
    pub(crate) const fn load(target: LoadTarget, source: LoadError) -> Self {
        Self::Load { target, source }
    }
}
