//! Shared fixtures and helpers for handshake tests.

mod world;

use std::str::FromStr;
use std::sync::Arc;

use lsp_types::{
    ClientCapabilities, DidChangeWatchedFilesClientCapabilities, InitializeParams, Uri,
    WorkspaceClientCapabilities, WorkspaceFolder,
};
use ripple_config::EnvironmentSnapshot;
use serde_json::{Value, json};

use crate::errors::InitializeError;
use crate::extension::{ExtensionModules, ExtensionSource};
use crate::module::ModuleLoader;
use crate::test_support::InMemoryModuleLoader;

pub use world::TestWorld;

/// Extension root used by every fixture installation.
pub const EXT_ROOT: &str = "/ext";

/// A Ripple compiler, a TypeScript 5 SDK with a French message table, and
/// both extension modules.
#[must_use]
pub fn installation() -> InMemoryModuleLoader {
    InMemoryModuleLoader::default()
        .with_module("/opt/ripple")
        .with_module("/opt/ts/typescript.js")
        .with_json("/opt/package.json", json!({ "name": "typescript", "version": "5.6.3" }))
        .with_json(
            "/opt/ts/fr/diagnosticMessages.generated.json",
            json!({ "Cannot_find_name_0_2304": "Impossible de trouver le nom '{0}'." }),
        )
        .with_module("/ext/language.js")
        .with_module("/ext/ts.js")
}

/// Options naming both dependency paths.
#[must_use]
pub fn full_options() -> Value {
    json!({ "ripplePath": "/opt/ripple", "typescript": { "tsdk": "/opt/ts" } })
}

/// Builds an initialize request.
#[must_use]
pub fn initialize_params(
    options: Option<Value>,
    locale: Option<&str>,
    dynamic_watch: bool,
) -> InitializeParams {
    InitializeParams {
        initialization_options: options,
        locale: locale.map(str::to_owned),
        capabilities: ClientCapabilities {
            workspace: Some(WorkspaceClientCapabilities {
                did_change_watched_files: Some(DidChangeWatchedFilesClientCapabilities {
                    dynamic_registration: Some(dynamic_watch),
                    relative_pattern_support: None,
                }),
                ..WorkspaceClientCapabilities::default()
            }),
            ..ClientCapabilities::default()
        },
        workspace_folders: Some(vec![WorkspaceFolder {
            uri: uri("file:///work"),
            name: String::from("work"),
        }]),
        ..InitializeParams::default()
    }
}

/// Parses a URI literal.
#[must_use]
pub fn uri(text: &str) -> Uri {
    Uri::from_str(text).expect("invalid test URI")
}

/// Environment snapshot from literal pairs.
#[must_use]
pub fn environment(vars: &[(&str, &str)]) -> EnvironmentSnapshot {
    EnvironmentSnapshot::from_vars(vars.iter().copied())
}

/// Extension source returning prebuilt factories.
pub struct StaticExtensions(pub ExtensionModules);

impl ExtensionSource for StaticExtensions {
    fn load(&self, _loader: &dyn ModuleLoader) -> Result<ExtensionModules, InitializeError> {
        Ok(self.0.clone())
    }
}

/// Shares a loader with a session while keeping a handle for assertions.
#[must_use]
pub fn shared(loader: &InMemoryModuleLoader) -> Arc<dyn ModuleLoader> {
    Arc::new(loader.clone())
}
