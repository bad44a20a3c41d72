//! The initialize handshake and the session it produces.
//!
//! A [`Session`] walks `Uninitialized → Resolving → Loading → Composing →
//! Ready`, or ends in `Failed` on the first error. Runtime handles, plugins
//! and the project service are assembled into a [`ComposedServer`] and only
//! stored once every step has succeeded, so a failed handshake never leaves
//! a partially built server behind.

use std::sync::Arc;

use camino::Utf8PathBuf;
use lsp_types::{InitializeParams, InitializeResult, Registration, ServerInfo, Uri};
use ripple_config::{
    DEFAULT_LOCALE, EnvironmentSnapshot, InitializationOptions, SERVER_NAME, resolve,
};
use tracing::{debug, info, warn};

use crate::capability::{ServicePluginSet, aggregate};
use crate::errors::{InitializeError, LoadTarget, SessionState};
use crate::extension::ExtensionSource;
use crate::language::LanguagePlugin;
use crate::module::{ModuleHandle, ModuleLoader};
use crate::project::{Project, ProjectServiceFactory};
use crate::reporter::InitReporter;
use crate::sdk::{DiagnosticMessages, TypeScriptSdk, load_tsdk};
use crate::uri::uri_to_path;
use crate::watcher::FileWatcher;

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Context attached to reported handshake failures.
const INITIALIZE_CONTEXT: &str = "Failed during onInitialize";

/// The loaded compiler and SDK for one client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRuntimeHandles {
    /// The Ripple compiler module.
    pub ripple: ModuleHandle,
    /// The TypeScript SDK.
    pub typescript: TypeScriptSdk,
    /// Diagnostic messages for the negotiated locale.
    pub diagnostic_messages: DiagnosticMessages,
}

/// Everything the handshake produced, exposed only once complete.
#[derive(Debug)]
pub struct ComposedServer {
    handles: ResolvedRuntimeHandles,
    language_plugins: Vec<LanguagePlugin>,
    plugins: ServicePluginSet,
    project_service: ProjectServiceFactory,
    initialize_result: InitializeResult,
    dynamic_watch_registration: bool,
}

impl ComposedServer {
    /// Loaded compiler and SDK.
    #[must_use]
    pub const fn handles(&self) -> &ResolvedRuntimeHandles {
        &self.handles
    }

    /// Language plugins wired into the project service.
    #[must_use]
    pub fn language_plugins(&self) -> &[LanguagePlugin] {
        &self.language_plugins
    }

    /// Ordered service plugins answering protocol requests.
    #[must_use]
    pub const fn plugins(&self) -> &ServicePluginSet {
        &self.plugins
    }

    /// Project-aware service factory.
    #[must_use]
    pub const fn project_service(&self) -> &ProjectServiceFactory {
        &self.project_service
    }

    /// Response returned to the client.
    #[must_use]
    pub const fn initialize_result(&self) -> &InitializeResult {
        &self.initialize_result
    }
}

/// One client session of the language server.
pub struct Session {
    loader: Arc<dyn ModuleLoader>,
    extensions: Arc<dyn ExtensionSource>,
    reporter: Arc<dyn InitReporter>,
    environment: EnvironmentSnapshot,
    state: SessionState,
    server: Option<ComposedServer>,
    watcher: FileWatcher,
}

impl Session {
    /// Builds an uninitialized session.
    ///
    /// `environment` is consulted only for paths missing from the client's
    /// initialization options.
    #[must_use]
    pub fn new(
        loader: Arc<dyn ModuleLoader>,
        extensions: Arc<dyn ExtensionSource>,
        reporter: Arc<dyn InitReporter>,
        environment: EnvironmentSnapshot,
    ) -> Self {
        Self {
            loader,
            extensions,
            reporter,
            environment,
            state: SessionState::Uninitialized,
            server: None,
            watcher: FileWatcher::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The composed server once the session is ready.
    #[must_use]
    pub const fn server(&self) -> Option<&ComposedServer> {
        self.server.as_ref()
    }

    /// Handles the `initialize` request.
    ///
    /// # Errors
    ///
    /// Returns [`InitializeError::AlreadyInitialized`] for a repeated request,
    /// leaving the session untouched. Every other error moves the session to
    /// [`SessionState::Failed`] after being reported.
    pub fn initialize(
        &mut self,
        params: &InitializeParams,
    ) -> Result<InitializeResult, InitializeError> {
        if self.state != SessionState::Uninitialized {
            let error = InitializeError::AlreadyInitialized { state: self.state };
            self.reporter.report(INITIALIZE_CONTEXT, &error);
            return Err(error);
        }

        match self.compose(params) {
            Ok(server) => {
                let result = server.initialize_result.clone();
                info!(
                    target: SESSION_TARGET,
                    plugins = server.plugins.len(),
                    ripple = %server.handles.ripple.path(),
                    tsdk = %server.handles.typescript.root(),
                    "session ready"
                );
                self.server = Some(server);
                self.enter(SessionState::Ready);
                Ok(result)
            }
            Err(error) => {
                self.reporter.report(INITIALIZE_CONTEXT, &error);
                self.enter(SessionState::Failed);
                Err(error)
            }
        }
    }

    /// Handles the `initialized` notification.
    ///
    /// Returns the file-watch registration to send to the client, or `None`
    /// when the client cannot register watchers dynamically or the patterns
    /// are already registered.
    ///
    /// # Errors
    ///
    /// Returns [`InitializeError::NotReady`] unless the session is ready.
    pub fn initialized(&mut self) -> Result<Option<Registration>, InitializeError> {
        let server = self.ready_server()?;
        if !server.dynamic_watch_registration {
            debug!(
                target: SESSION_TARGET,
                "client cannot register file watchers dynamically"
            );
            return Ok(None);
        }
        let patterns: Vec<String> = server
            .language_plugins
            .iter()
            .flat_map(LanguagePlugin::watch_patterns)
            .collect();
        Ok(self.watcher.watch_files(patterns))
    }

    /// Resolves the project owning an opened document.
    ///
    /// Returns `None` for documents without a filesystem path.
    ///
    /// # Errors
    ///
    /// Returns [`InitializeError::NotReady`] unless the session is ready.
    pub fn open_document(&self, uri: &Uri) -> Result<Option<Arc<Project>>, InitializeError> {
        let server = self.ready_server()?;
        let Some(path) = uri_to_path(uri) else {
            warn!(target: SESSION_TARGET, uri = uri.as_str(), "document has no file path");
            return Ok(None);
        };
        Ok(Some(server.project_service.project_for_document(&path)))
    }

    fn ready_server(&self) -> Result<&ComposedServer, InitializeError> {
        match (self.state, self.server.as_ref()) {
            (SessionState::Ready, Some(server)) => Ok(server),
            (state, _) => Err(InitializeError::NotReady { state }),
        }
    }

    fn enter(&mut self, state: SessionState) {
        debug!(target: SESSION_TARGET, from = %self.state, to = %state, "session transition");
        self.state = state;
    }

    fn compose(&mut self, params: &InitializeParams) -> Result<ComposedServer, InitializeError> {
        self.enter(SessionState::Resolving);
        let options = InitializationOptions::from_value(params.initialization_options.as_ref())?;
        let paths = resolve(&options, &self.environment)?;

        self.enter(SessionState::Loading);
        let ripple = self
            .loader
            .load(paths.ripple().path())
            .map_err(|source| InitializeError::load(LoadTarget::RippleCompiler, source))?;
        let locale = params
            .locale
            .as_deref()
            .map(str::trim)
            .filter(|locale| !locale.is_empty())
            .unwrap_or(DEFAULT_LOCALE);
        let sdk = load_tsdk(self.loader.as_ref(), paths.tsdk().path(), locale)
            .map_err(|source| InitializeError::load(LoadTarget::TypeScriptSdk, source))?;
        let extensions = self.extensions.load(self.loader.as_ref())?;

        self.enter(SessionState::Composing);
        let language_plugin = extensions.language().language_plugin(&ripple)?;
        let generic = extensions.typescript().typescript_plugins(&sdk.typescript)?;
        let plugins = aggregate(generic, extensions.language().diagnostic_plugin())?;
        let language_plugins = vec![language_plugin];
        let project_service = ProjectServiceFactory::build(
            sdk.typescript.clone(),
            sdk.diagnostic_messages.clone(),
            language_plugins.clone(),
        )
        .with_workspace_folders(workspace_folders(params));
        let initialize_result = InitializeResult {
            capabilities: plugins.server_capabilities(),
            server_info: Some(ServerInfo {
                name: SERVER_NAME.to_owned(),
                version: Some(env!("CARGO_PKG_VERSION").to_owned()),
            }),
        };

        Ok(ComposedServer {
            handles: ResolvedRuntimeHandles {
                ripple,
                typescript: sdk.typescript,
                diagnostic_messages: sdk.diagnostic_messages,
            },
            language_plugins,
            plugins,
            project_service,
            initialize_result,
            dynamic_watch_registration: supports_dynamic_watch(params),
        })
    }
}

fn workspace_folders(params: &InitializeParams) -> Vec<Utf8PathBuf> {
    params
        .workspace_folders
        .iter()
        .flatten()
        .filter_map(|folder| uri_to_path(&folder.uri))
        .collect()
}

fn supports_dynamic_watch(params: &InitializeParams) -> bool {
    params
        .capabilities
        .workspace
        .as_ref()
        .and_then(|workspace| workspace.did_change_watched_files.as_ref())
        .and_then(|watched| watched.dynamic_registration)
        .unwrap_or(false)
}
