//! Ripple language plugin descriptor.
//!
//! A language plugin tells the project service how Ripple source files map
//! into the virtual TypeScript documents the SDK analyses: which extensions
//! belong to the language, what kind of script the embedded code is, and how
//! the SDK should treat the extension when it walks a project.

use camino::Utf8Path;

use crate::module::ModuleHandle;

/// Language identifier reported for Ripple documents.
pub const RIPPLE_LANGUAGE_ID: &str = "ripple";

/// File extension of Ripple source files, without the leading dot.
pub const RIPPLE_EXTENSION: &str = "ripple";

/// TypeScript script kinds, numbered as in the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    /// Kind could not be determined.
    Unknown = 0,
    /// JavaScript.
    Js = 1,
    /// JavaScript with JSX.
    Jsx = 2,
    /// TypeScript.
    Ts = 3,
    /// TypeScript with JSX.
    Tsx = 4,
    /// Script owned by another host.
    External = 5,
    /// JSON.
    Json = 6,
    /// Decided later by a language plugin.
    Deferred = 7,
}

impl ScriptKind {
    /// Numeric value understood by the SDK.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Extension the SDK has to accept as part of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraFileExtension {
    /// Extension without the leading dot.
    pub extension: String,
    /// Whether files mix embedded code with other content.
    pub is_mixed_content: bool,
    /// Script kind the SDK assigns before the plugin decides.
    pub script_kind: ScriptKind,
}

/// Shape of the virtual script generated for a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceScript {
    /// Extension of the virtual file, with the leading dot.
    pub extension: String,
    /// Script kind of the virtual file.
    pub script_kind: ScriptKind,
}

/// Read-only descriptor mapping a source language into virtual documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePlugin {
    language_id: String,
    extensions: Vec<String>,
    service_script: ServiceScript,
    extra_file_extensions: Vec<ExtraFileExtension>,
    compiler: ModuleHandle,
}

impl LanguagePlugin {
    /// Builds the Ripple descriptor backed by the loaded compiler.
    #[must_use]
    pub fn ripple(compiler: ModuleHandle) -> Self {
        Self {
            language_id: RIPPLE_LANGUAGE_ID.to_owned(),
            extensions: vec![RIPPLE_EXTENSION.to_owned()],
            service_script: ServiceScript {
                extension: String::from(".tsx"),
                script_kind: ScriptKind::Tsx,
            },
            extra_file_extensions: vec![ExtraFileExtension {
                extension: RIPPLE_EXTENSION.to_owned(),
                is_mixed_content: true,
                script_kind: ScriptKind::Deferred,
            }],
            compiler,
        }
    }

    /// Language identifier of documents handled by this plugin.
    #[must_use]
    pub const fn language_id(&self) -> &str {
        self.language_id.as_str()
    }

    /// Source file extensions, without leading dots.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Virtual script generated for each source file.
    #[must_use]
    pub const fn service_script(&self) -> &ServiceScript {
        &self.service_script
    }

    /// Extensions the SDK must accept as project files.
    #[must_use]
    pub fn extra_file_extensions(&self) -> &[ExtraFileExtension] {
        &self.extra_file_extensions
    }

    /// Compiler module generating the virtual code.
    #[must_use]
    pub const fn compiler(&self) -> &ModuleHandle {
        &self.compiler
    }

    /// Returns the language id when `path` belongs to this plugin.
    #[must_use]
    pub fn language_id_for(&self, path: &Utf8Path) -> Option<&str> {
        let extension = path.extension()?;
        self.extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(extension))
            .then_some(self.language_id.as_str())
    }

    /// Glob patterns matching every source file of the language.
    #[must_use]
    pub fn watch_patterns(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|extension| format!("**/*.{extension}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn plugin() -> LanguagePlugin {
        LanguagePlugin::ripple(ModuleHandle::new("/opt/ripple"))
    }

    #[rstest]
    #[case("/workspace/src/App.ripple", Some(RIPPLE_LANGUAGE_ID))]
    #[case("/workspace/src/Card.RIPPLE", Some(RIPPLE_LANGUAGE_ID))]
    #[case("/workspace/src/main.ts", None)]
    #[case("/workspace/README", None)]
    fn maps_ripple_files(
        plugin: LanguagePlugin,
        #[case] path: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(plugin.language_id_for(Utf8Path::new(path)), expected);
    }

    #[rstest]
    fn embeds_ripple_as_tsx(plugin: LanguagePlugin) {
        assert_eq!(plugin.service_script().extension, ".tsx");
        assert_eq!(plugin.service_script().script_kind.code(), 4);

        let extra = plugin
            .extra_file_extensions()
            .first()
            .expect("extra extension");
        assert!(extra.is_mixed_content);
        assert_eq!(extra.script_kind, ScriptKind::Deferred);
    }

    #[rstest]
    fn watches_every_ripple_file(plugin: LanguagePlugin) {
        assert_eq!(plugin.watch_patterns(), vec![String::from("**/*.ripple")]);
    }
}
