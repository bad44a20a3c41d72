//! Initialization and plugin composition for the Ripple language server.
//!
//! The crate owns the `initialize` handshake: it resolves the Ripple compiler
//! and TypeScript SDK locations, loads them through a [`ModuleLoader`], builds
//! the Ripple [`LanguagePlugin`], wires it into a [`ProjectServiceFactory`],
//! and merges the generic TypeScript service plugins with the Ripple
//! diagnostics plugin into one ordered [`ServicePluginSet`]. The resulting
//! [`ComposedServer`] is only exposed once every step has succeeded.
//!
//! Request dispatch after the handshake belongs to the protocol runtime; this
//! crate stops at handing it a fully composed server.

mod capability;
mod errors;
mod extension;
mod language;
mod module;
mod plugin;
mod project;
mod reporter;
mod sdk;
mod session;
mod uri;
mod watcher;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use capability::{ServicePluginSet, aggregate};
pub use errors::{
    CompositionError, InitializeError, LoadError, LoadTarget, SessionState,
};
pub use extension::{
    ExtensionModules, ExtensionRoot, ExtensionSource, LANGUAGE_MODULE, LanguageExtension,
    RippleLanguageExtension, TYPESCRIPT_MODULE, TypeScriptExtension, TypeScriptServiceExtension,
};
pub use language::{
    ExtraFileExtension, LanguagePlugin, RIPPLE_EXTENSION, RIPPLE_LANGUAGE_ID, ScriptKind,
    ServiceScript,
};
pub use module::{FsModuleLoader, ModuleHandle, ModuleLoader, PackageManifest};
pub use plugin::{PluginCapability, ServicePlugin, ServicePluginId};
pub use project::{Project, ProjectServiceFactory};
pub use reporter::{InitReporter, LOG_TAG, TracingReporter};
pub use sdk::{DiagnosticMessages, LoadedSdk, TypeScriptSdk, load_tsdk};
pub use session::{ComposedServer, ResolvedRuntimeHandles, Session};
pub use uri::uri_to_path;
pub use watcher::{FileWatcher, WATCHED_FILES_METHOD, WATCH_REGISTRATION_ID};

#[cfg(test)]
mod tests;
