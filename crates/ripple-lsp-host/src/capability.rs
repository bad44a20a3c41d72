//! Service plugin aggregation and capability negotiation.

use std::collections::BTreeSet;

use lsp_types::{
    CallHierarchyServerCapability, CodeActionProviderCapability, CompletionOptions,
    DiagnosticOptions, DiagnosticServerCapabilities, DocumentOnTypeFormattingOptions,
    FoldingRangeProviderCapability, HoverProviderCapability, ImplementationProviderCapability,
    OneOf, SelectionRangeProviderCapability, SemanticTokenModifier, SemanticTokenType,
    SemanticTokensFullOptions, SemanticTokensLegend, SemanticTokensOptions,
    SemanticTokensServerCapabilities, ServerCapabilities, SignatureHelpOptions,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TypeDefinitionProviderCapability,
};

use crate::errors::CompositionError;
use crate::language::RIPPLE_LANGUAGE_ID;
use crate::plugin::{PluginCapability, ServicePlugin, ServicePluginId};

const ON_TYPE_FORMATTING_TRIGGERS: [&str; 3] = [";", "}", "\n"];

/// The ordered service plugin list answering protocol requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePluginSet {
    plugins: Vec<ServicePlugin>,
}

/// Appends the custom diagnostics plugin to the generic plugin list.
///
/// Generic plugins keep their order and always precede `diagnostics`.
///
/// # Errors
///
/// Returns [`CompositionError::DuplicatePlugin`] when two plugins share an
/// identity.
pub fn aggregate(
    generic: Vec<ServicePlugin>,
    diagnostics: ServicePlugin,
) -> Result<ServicePluginSet, CompositionError> {
    let mut seen = BTreeSet::new();
    let mut plugins = generic;
    plugins.push(diagnostics);
    for plugin in &plugins {
        if !seen.insert(plugin.id().clone()) {
            return Err(CompositionError::DuplicatePlugin {
                id: plugin.id().to_string(),
            });
        }
    }
    Ok(ServicePluginSet { plugins })
}

impl ServicePluginSet {
    /// Plugins in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &ServicePlugin> {
        self.plugins.iter()
    }

    /// Number of plugins.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin identities in dispatch order.
    #[must_use]
    pub fn ids(&self) -> Vec<&ServicePluginId> {
        self.plugins.iter().map(ServicePlugin::id).collect()
    }

    /// Whether any plugin answers `capability`.
    #[must_use]
    pub fn supports(&self, capability: PluginCapability) -> bool {
        self.plugins.iter().any(|plugin| plugin.supports(capability))
    }

    /// Derives the server capabilities advertised in the initialize response.
    #[must_use]
    pub fn server_capabilities(&self) -> ServerCapabilities {
        let enabled = |capability: PluginCapability| self.supports(capability).then_some(true);

        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    ..TextDocumentSyncOptions::default()
                },
            )),
            hover_provider: enabled(PluginCapability::Hover).map(HoverProviderCapability::Simple),
            completion_provider: self.supports(PluginCapability::Completion).then(|| {
                CompletionOptions {
                    resolve_provider: Some(true),
                    trigger_characters: Some(self.merged(ServicePlugin::completion_triggers)),
                    ..CompletionOptions::default()
                }
            }),
            signature_help_provider: self.supports(PluginCapability::SignatureHelp).then(|| {
                SignatureHelpOptions {
                    trigger_characters: Some(self.merged(ServicePlugin::signature_triggers)),
                    retrigger_characters: Some(vec![")".to_owned()]),
                    ..SignatureHelpOptions::default()
                }
            }),
            definition_provider: enabled(PluginCapability::Definition).map(OneOf::Left),
            type_definition_provider: enabled(PluginCapability::TypeDefinition)
                .map(TypeDefinitionProviderCapability::Simple),
            implementation_provider: enabled(PluginCapability::Implementation)
                .map(ImplementationProviderCapability::Simple),
            references_provider: enabled(PluginCapability::References).map(OneOf::Left),
            rename_provider: enabled(PluginCapability::Rename).map(OneOf::Left),
            document_symbol_provider: enabled(PluginCapability::DocumentSymbols).map(OneOf::Left),
            workspace_symbol_provider: enabled(PluginCapability::WorkspaceSymbols)
                .map(OneOf::Left),
            code_action_provider: enabled(PluginCapability::CodeActions)
                .map(CodeActionProviderCapability::Simple),
            document_formatting_provider: enabled(PluginCapability::Formatting).map(OneOf::Left),
            document_range_formatting_provider: enabled(PluginCapability::RangeFormatting)
                .map(OneOf::Left),
            document_on_type_formatting_provider: self
                .supports(PluginCapability::OnTypeFormatting)
                .then(on_type_formatting),
            folding_range_provider: enabled(PluginCapability::FoldingRanges)
                .map(FoldingRangeProviderCapability::Simple),
            selection_range_provider: enabled(PluginCapability::SelectionRanges)
                .map(SelectionRangeProviderCapability::Simple),
            semantic_tokens_provider: self
                .supports(PluginCapability::SemanticTokens)
                .then(semantic_tokens),
            inlay_hint_provider: enabled(PluginCapability::InlayHints).map(OneOf::Left),
            call_hierarchy_provider: enabled(PluginCapability::CallHierarchy)
                .map(CallHierarchyServerCapability::Simple),
            diagnostic_provider: self.supports(PluginCapability::Diagnostics).then(|| {
                DiagnosticServerCapabilities::Options(DiagnosticOptions {
                    identifier: Some(RIPPLE_LANGUAGE_ID.to_owned()),
                    inter_file_dependencies: true,
                    workspace_diagnostics: false,
                    ..DiagnosticOptions::default()
                })
            }),
            ..ServerCapabilities::default()
        }
    }

    /// Trigger characters in plugin order, first occurrence wins.
    fn merged(&self, triggers: fn(&ServicePlugin) -> &[String]) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.plugins
            .iter()
            .flat_map(triggers)
            .filter(|trigger| seen.insert(trigger.as_str()))
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a ServicePluginSet {
    type Item = &'a ServicePlugin;
    type IntoIter = std::slice::Iter<'a, ServicePlugin>;

    fn into_iter(self) -> Self::IntoIter {
        self.plugins.iter()
    }
}

fn on_type_formatting() -> DocumentOnTypeFormattingOptions {
    let [first, rest @ ..] = ON_TYPE_FORMATTING_TRIGGERS;
    DocumentOnTypeFormattingOptions {
        first_trigger_character: first.to_owned(),
        more_trigger_character: Some(rest.iter().map(|&trigger| trigger.to_owned()).collect()),
    }
}

fn semantic_tokens() -> SemanticTokensServerCapabilities {
    let legend = SemanticTokensLegend {
        token_types: vec![
            SemanticTokenType::NAMESPACE,
            SemanticTokenType::CLASS,
            SemanticTokenType::ENUM,
            SemanticTokenType::INTERFACE,
            SemanticTokenType::TYPE_PARAMETER,
            SemanticTokenType::TYPE,
            SemanticTokenType::PARAMETER,
            SemanticTokenType::VARIABLE,
            SemanticTokenType::PROPERTY,
            SemanticTokenType::ENUM_MEMBER,
            SemanticTokenType::FUNCTION,
            SemanticTokenType::METHOD,
        ],
        token_modifiers: vec![
            SemanticTokenModifier::DECLARATION,
            SemanticTokenModifier::READONLY,
            SemanticTokenModifier::STATIC,
            SemanticTokenModifier::ASYNC,
            SemanticTokenModifier::DEFAULT_LIBRARY,
            SemanticTokenModifier::new("local"),
        ],
    };
    SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
        legend,
        range: Some(true),
        full: Some(SemanticTokensFullOptions::Bool(true)),
        ..SemanticTokensOptions::default()
    })
}
