//! Collaborator factories shipped in the editor extension.
//!
//! The extension root holds two modules: `language.js`, exporting the Ripple
//! language plugin and diagnostics plugin factories, and `ts.js`, exporting
//! the generic TypeScript service plugin factory. Both must load before any
//! factory is invoked.

use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ripple_config::ConfigError;
use tracing::debug;

use crate::errors::{CompositionError, InitializeError, LoadTarget};
use crate::language::{LanguagePlugin, RIPPLE_LANGUAGE_ID};
use crate::module::{ModuleHandle, ModuleLoader};
use crate::plugin::{PluginCapability, ServicePlugin};
use crate::sdk::TypeScriptSdk;

const EXTENSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::extension");

/// Module exporting the language and diagnostics plugin factories.
pub const LANGUAGE_MODULE: &str = "language.js";

/// Module exporting the generic TypeScript service plugin factory.
pub const TYPESCRIPT_MODULE: &str = "ts.js";

/// Factory for the Ripple language plugin and its diagnostics plugin.
pub trait LanguageExtension: Send + Sync {
    /// Builds the language plugin for a loaded compiler.
    ///
    /// # Errors
    ///
    /// Returns a [`CompositionError`] when the factory refuses the compiler.
    fn language_plugin(&self, compiler: &ModuleHandle) -> Result<LanguagePlugin, CompositionError>;

    /// Builds the Ripple diagnostics plugin.
    fn diagnostic_plugin(&self) -> ServicePlugin;
}

/// Factory for the generic TypeScript service plugins.
pub trait TypeScriptExtension: Send + Sync {
    /// Builds the ordered generic plugin list for a loaded SDK.
    ///
    /// # Errors
    ///
    /// Returns a [`CompositionError`] when the factory cannot serve the SDK.
    fn typescript_plugins(&self, sdk: &TypeScriptSdk)
    -> Result<Vec<ServicePlugin>, CompositionError>;
}

/// The loaded extension factories.
#[derive(Clone)]
pub struct ExtensionModules {
    language: Arc<dyn LanguageExtension>,
    typescript: Arc<dyn TypeScriptExtension>,
}

impl ExtensionModules {
    /// Bundles the two factories.
    #[must_use]
    pub fn new(
        language: Arc<dyn LanguageExtension>,
        typescript: Arc<dyn TypeScriptExtension>,
    ) -> Self {
        Self {
            language,
            typescript,
        }
    }

    /// Language and diagnostics plugin factory.
    #[must_use]
    pub fn language(&self) -> &dyn LanguageExtension {
        self.language.as_ref()
    }

    /// Generic TypeScript plugin factory.
    #[must_use]
    pub fn typescript(&self) -> &dyn TypeScriptExtension {
        self.typescript.as_ref()
    }
}

impl fmt::Debug for ExtensionModules {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("ExtensionModules")
    }
}

/// Source of the extension factories.
pub trait ExtensionSource: Send + Sync {
    /// Loads the factories.
    ///
    /// # Errors
    ///
    /// Returns [`InitializeError::Configuration`] when the source is not
    /// configured and [`InitializeError::Load`] when a module fails to load.
    fn load(&self, loader: &dyn ModuleLoader) -> Result<ExtensionModules, InitializeError>;
}

/// Extension factories located under the `--extRoot` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRoot {
    root: Option<Utf8PathBuf>,
}

impl ExtensionRoot {
    /// Builds a source for the given root; `None` means the root is unknown.
    #[must_use]
    pub const fn new(root: Option<Utf8PathBuf>) -> Self {
        Self { root }
    }
}

impl ExtensionSource for ExtensionRoot {
    fn load(&self, loader: &dyn ModuleLoader) -> Result<ExtensionModules, InitializeError> {
        let root = self
            .root
            .as_deref()
            .ok_or(ConfigError::MissingExtensionRoot)?;

        let load_module = |name: &'static str| {
            loader
                .load(&root.join(name))
                .map_err(|source| InitializeError::load(LoadTarget::Extension(name), source))
        };
        let language = load_module(LANGUAGE_MODULE)?;
        let typescript = load_module(TYPESCRIPT_MODULE)?;
        debug!(target: EXTENSION_TARGET, root = %root, "loaded extension modules");

        Ok(ExtensionModules::new(
            Arc::new(RippleLanguageExtension::new(language)),
            Arc::new(TypeScriptServiceExtension::new(typescript)),
        ))
    }
}

/// Ripple factories bound to the extension's `language.js`.
#[derive(Debug, Clone)]
pub struct RippleLanguageExtension {
    module: ModuleHandle,
}

impl RippleLanguageExtension {
    /// Identity of the diagnostics plugin.
    pub const DIAGNOSTICS_PLUGIN: &'static str = "ripple-diagnostics";

    /// Binds the factories to a loaded module.
    #[must_use]
    pub const fn new(module: ModuleHandle) -> Self {
        Self { module }
    }

    /// The module the factories were loaded from.
    #[must_use]
    pub const fn module(&self) -> &ModuleHandle {
        &self.module
    }
}

impl LanguageExtension for RippleLanguageExtension {
    fn language_plugin(&self, compiler: &ModuleHandle) -> Result<LanguagePlugin, CompositionError> {
        Ok(LanguagePlugin::ripple(compiler.clone()))
    }

    fn diagnostic_plugin(&self) -> ServicePlugin {
        ServicePlugin::new(Self::DIAGNOSTICS_PLUGIN).with_diagnostic_source(RIPPLE_LANGUAGE_ID)
    }
}

/// Generic TypeScript factories bound to the extension's `ts.js`.
#[derive(Debug, Clone)]
pub struct TypeScriptServiceExtension {
    module: ModuleHandle,
}

impl TypeScriptServiceExtension {
    /// Binds the factory to a loaded module.
    #[must_use]
    pub const fn new(module: ModuleHandle) -> Self {
        Self { module }
    }

    /// The module the factory was loaded from.
    #[must_use]
    pub const fn module(&self) -> &ModuleHandle {
        &self.module
    }
}

impl TypeScriptExtension for TypeScriptServiceExtension {
    fn typescript_plugins(
        &self,
        sdk: &TypeScriptSdk,
    ) -> Result<Vec<ServicePlugin>, CompositionError> {
        debug!(
            target: EXTENSION_TARGET,
            sdk = %sdk.root(),
            "building TypeScript service plugins"
        );
        Ok(vec![
            ServicePlugin::new("typescript-syntactic").with_capabilities([
                PluginCapability::DocumentSymbols,
                PluginCapability::FoldingRanges,
                PluginCapability::SelectionRanges,
                PluginCapability::Formatting,
                PluginCapability::RangeFormatting,
                PluginCapability::OnTypeFormatting,
            ]),
            ServicePlugin::new("typescript-semantic")
                .with_capabilities([
                    PluginCapability::Hover,
                    PluginCapability::Definition,
                    PluginCapability::TypeDefinition,
                    PluginCapability::Implementation,
                    PluginCapability::References,
                    PluginCapability::Rename,
                    PluginCapability::WorkspaceSymbols,
                    PluginCapability::CodeActions,
                    PluginCapability::SemanticTokens,
                    PluginCapability::InlayHints,
                    PluginCapability::CallHierarchy,
                ])
                .with_completion_triggers([".", "\"", "'", "`", "/", "@", "<", "#", " "])
                .with_signature_triggers(["(", ",", "<"])
                .with_diagnostic_source("ts"),
            ServicePlugin::new("typescript-doc-comment-template").with_completion_triggers(["*"]),
            ServicePlugin::new("typescript-directive-comment").with_completion_triggers(["@"]),
        ])
    }
}
