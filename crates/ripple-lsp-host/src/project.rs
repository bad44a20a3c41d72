//! Project-aware service factory.
//!
//! Per-workspace analysis contexts are created on first use and shared by
//! every later request for the same root.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::language::LanguagePlugin;
use crate::sdk::{DiagnosticMessages, TypeScriptSdk};

const PROJECT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::project");

/// Script extensions the SDK analyses natively.
const SCRIPT_EXTENSIONS: [&str; 8] = ["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// TypeScript-aware analysis context for one workspace root.
#[derive(Debug)]
pub struct Project {
    root: Utf8PathBuf,
    typescript: TypeScriptSdk,
    messages: DiagnosticMessages,
    language_plugins: Arc<[LanguagePlugin]>,
}

impl Project {
    /// Workspace root the project covers.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        self.root.as_path()
    }

    /// SDK analysing the project.
    #[must_use]
    pub const fn typescript(&self) -> &TypeScriptSdk {
        &self.typescript
    }

    /// Localized diagnostic messages.
    #[must_use]
    pub const fn messages(&self) -> &DiagnosticMessages {
        &self.messages
    }

    /// Language plugins mapping custom files into virtual scripts.
    #[must_use]
    pub fn language_plugins(&self) -> &[LanguagePlugin] {
        &self.language_plugins
    }

    /// Whether `path` lies under the root and is a script or custom source.
    #[must_use]
    pub fn is_project_file(&self, path: &Utf8Path) -> bool {
        if !path.starts_with(&self.root) {
            return false;
        }
        let native = path.extension().is_some_and(|extension| {
            SCRIPT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        });
        native || self.language_plugin_for(path).is_some()
    }

    /// The language plugin mapping `path` into a virtual script, if any.
    #[must_use]
    pub fn language_plugin_for(&self, path: &Utf8Path) -> Option<&LanguagePlugin> {
        self.language_plugins
            .iter()
            .find(|plugin| plugin.language_id_for(path).is_some())
    }
}

/// Lazily builds one [`Project`] per workspace root.
#[derive(Debug)]
pub struct ProjectServiceFactory {
    typescript: TypeScriptSdk,
    messages: DiagnosticMessages,
    language_plugins: Arc<[LanguagePlugin]>,
    workspace_folders: Vec<Utf8PathBuf>,
    projects: Mutex<BTreeMap<Utf8PathBuf, Arc<Project>>>,
}

impl ProjectServiceFactory {
    /// Captures the SDK, message table and language plugins.
    ///
    /// No project is created until one is requested.
    #[must_use]
    pub fn build(
        typescript: TypeScriptSdk,
        messages: DiagnosticMessages,
        language_plugins: Vec<LanguagePlugin>,
    ) -> Self {
        Self {
            typescript,
            messages,
            language_plugins: language_plugins.into(),
            workspace_folders: Vec::new(),
            projects: Mutex::new(BTreeMap::new()),
        }
    }

    /// Sets the workspace folders announced by the client.
    #[must_use]
    pub fn with_workspace_folders(mut self, folders: Vec<Utf8PathBuf>) -> Self {
        self.workspace_folders = folders;
        self
    }

    /// Workspace folders announced by the client.
    #[must_use]
    pub fn workspace_folders(&self) -> &[Utf8PathBuf] {
        &self.workspace_folders
    }

    /// Language plugins handed to every project.
    #[must_use]
    pub fn language_plugins(&self) -> &[LanguagePlugin] {
        &self.language_plugins
    }

    /// Localized diagnostic messages handed to every project.
    #[must_use]
    pub const fn messages(&self) -> &DiagnosticMessages {
        &self.messages
    }

    /// Returns the project for `root`, creating it on first use.
    #[must_use]
    pub fn project_for(&self, root: &Utf8Path) -> Arc<Project> {
        let mut projects = self.projects.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(project) = projects.get(root) {
            return Arc::clone(project);
        }
        debug!(target: PROJECT_TARGET, root = %root, "creating project");
        let project = Arc::new(Project {
            root: root.to_path_buf(),
            typescript: self.typescript.clone(),
            messages: self.messages.clone(),
            language_plugins: Arc::clone(&self.language_plugins),
        });
        projects.insert(root.to_path_buf(), Arc::clone(&project));
        project
    }

    /// Returns the project owning the document at `path`.
    ///
    /// The deepest enclosing workspace folder wins; documents outside every
    /// folder get a project rooted at their parent directory.
    #[must_use]
    pub fn project_for_document(&self, path: &Utf8Path) -> Arc<Project> {
        let root = self
            .workspace_folders
            .iter()
            .filter(|folder| path.starts_with(folder))
            .max_by_key(|folder| folder.components().count())
            .map(Utf8PathBuf::as_path)
            .or_else(|| path.parent())
            .unwrap_or(path);
        self.project_for(root)
    }

    /// Number of projects created so far.
    #[must_use]
    pub fn project_count(&self) -> usize {
        self.projects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
