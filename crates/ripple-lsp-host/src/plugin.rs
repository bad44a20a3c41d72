//! Service plugin descriptors.

use std::collections::BTreeSet;
use std::fmt;

/// Stable identity of a service plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServicePluginId(String);

impl ServicePluginId {
    /// Builds an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ServicePluginId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Protocol feature a service plugin can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluginCapability {
    /// `textDocument/hover`.
    Hover,
    /// `textDocument/completion`.
    Completion,
    /// `textDocument/signatureHelp`.
    SignatureHelp,
    /// `textDocument/definition`.
    Definition,
    /// `textDocument/typeDefinition`.
    TypeDefinition,
    /// `textDocument/implementation`.
    Implementation,
    /// `textDocument/references`.
    References,
    /// `textDocument/rename`.
    Rename,
    /// `textDocument/documentSymbol`.
    DocumentSymbols,
    /// `workspace/symbol`.
    WorkspaceSymbols,
    /// `textDocument/codeAction`.
    CodeActions,
    /// `textDocument/formatting`.
    Formatting,
    /// `textDocument/rangeFormatting`.
    RangeFormatting,
    /// `textDocument/onTypeFormatting`.
    OnTypeFormatting,
    /// `textDocument/foldingRange`.
    FoldingRanges,
    /// `textDocument/selectionRange`.
    SelectionRanges,
    /// `textDocument/semanticTokens`.
    SemanticTokens,
    /// `textDocument/inlayHint`.
    InlayHints,
    /// `textDocument/prepareCallHierarchy` and related requests.
    CallHierarchy,
    /// Document diagnostics.
    Diagnostics,
}

/// A capability provider registered with the protocol dispatcher.
///
/// Plugins are ordered: later plugins may augment results produced by
/// earlier ones, which is why the Ripple diagnostics plugin always comes last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePlugin {
    id: ServicePluginId,
    capabilities: BTreeSet<PluginCapability>,
    completion_triggers: Vec<String>,
    signature_triggers: Vec<String>,
    diagnostic_source: Option<String>,
}

impl ServicePlugin {
    /// Builds a plugin without capabilities.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ServicePluginId::new(id),
            capabilities: BTreeSet::new(),
            completion_triggers: Vec::new(),
            signature_triggers: Vec::new(),
            diagnostic_source: None,
        }
    }

    /// Adds capabilities.
    #[must_use]
    pub fn with_capabilities<I>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = PluginCapability>,
    {
        self.capabilities.extend(capabilities);
        self
    }

    /// Declares completion trigger characters (implies completion support).
    #[must_use]
    pub fn with_completion_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.insert(PluginCapability::Completion);
        self.completion_triggers
            .extend(triggers.into_iter().map(Into::into));
        self
    }

    /// Declares signature help trigger characters (implies signature help).
    #[must_use]
    pub fn with_signature_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.insert(PluginCapability::SignatureHelp);
        self.signature_triggers
            .extend(triggers.into_iter().map(Into::into));
        self
    }

    /// Declares the `source` stamped on produced diagnostics (implies
    /// diagnostics support).
    #[must_use]
    pub fn with_diagnostic_source(mut self, source: impl Into<String>) -> Self {
        self.capabilities.insert(PluginCapability::Diagnostics);
        self.diagnostic_source = Some(source.into());
        self
    }

    /// Plugin identity.
    #[must_use]
    pub const fn id(&self) -> &ServicePluginId {
        &self.id
    }

    /// Whether the plugin answers `capability`.
    #[must_use]
    pub fn supports(&self, capability: PluginCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Capabilities in a stable order.
    pub fn capabilities(&self) -> impl Iterator<Item = PluginCapability> + '_ {
        self.capabilities.iter().copied()
    }

    /// Completion trigger characters.
    #[must_use]
    pub fn completion_triggers(&self) -> &[String] {
        &self.completion_triggers
    }

    /// Signature help trigger characters.
    #[must_use]
    pub fn signature_triggers(&self) -> &[String] {
        &self.signature_triggers
    }

    /// Source label of diagnostics the plugin produces.
    #[must_use]
    pub fn diagnostic_source(&self) -> Option<&str> {
        self.diagnostic_source.as_deref()
    }
}
