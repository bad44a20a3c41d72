//! BDD test world wrapping a session and its collaborators.

use std::sync::Arc;

use camino::Utf8PathBuf;
use lsp_types::{InitializeResult, Registration};
use serde_json::Value;

use crate::errors::InitializeError;
use crate::extension::ExtensionRoot;
use crate::session::Session;
use crate::test_support::{InMemoryModuleLoader, RecordingReporter};

use super::{EXT_ROOT, environment, initialize_params, shared};

/// Shared state exercised by BDD step implementations.
#[derive(Default)]
pub struct TestWorld {
    /// Loader seeded with the modules available to the session.
    pub loader: InMemoryModuleLoader,
    /// Reporter capturing handshake failures.
    pub reporter: RecordingReporter,
    /// Raw `initializationOptions` sent by the client.
    pub options: Option<Value>,
    /// Locale sent by the client.
    pub locale: Option<String>,
    /// Environment variables visible to the session.
    pub env: Vec<(String, String)>,
    /// Whether the client registers file watchers dynamically.
    pub dynamic_watch: bool,
    /// Session under test, created by the first initialize.
    pub session: Option<Session>,
    /// Outcome of the last initialize request.
    pub outcome: Option<Result<InitializeResult, InitializeError>>,
    /// Registrations produced by `initialized` notifications.
    pub registrations: Vec<Registration>,
}

impl TestWorld {
    /// Sends the initialize request, creating the session on first use.
    pub fn initialize(&mut self) {
        let params = initialize_params(
            self.options.clone(),
            self.locale.as_deref(),
            self.dynamic_watch,
        );
        let vars: Vec<(&str, &str)> = self
            .env
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        let snapshot = environment(&vars);
        let loader = shared(&self.loader);
        let reporter = Arc::new(self.reporter.clone());
        let session = self.session.get_or_insert_with(|| {
            Session::new(
                loader,
                Arc::new(ExtensionRoot::new(Some(Utf8PathBuf::from(EXT_ROOT)))),
                reporter,
                snapshot,
            )
        });
        self.outcome = Some(session.initialize(&params));
    }

    /// Sends the `initialized` notification.
    pub fn initialized(&mut self) {
        let session = self.session.as_mut().expect("session not created");
        if let Some(registration) = session.initialized().expect("initialized") {
            self.registrations.push(registration);
        }
    }

    /// Successful initialize response.
    #[must_use]
    pub fn result(&self) -> &InitializeResult {
        match self.outcome.as_ref() {
            Some(Ok(result)) => result,
            other => panic!("expected a successful initialize, got {other:?}"),
        }
    }

    /// Failed initialize outcome.
    #[must_use]
    pub fn error(&self) -> &InitializeError {
        match self.outcome.as_ref() {
            Some(Err(error)) => error,
            other => panic!("expected a failed initialize, got {other:?}"),
        }
    }

    /// Session created by the first initialize.
    #[must_use]
    pub fn session(&self) -> &Session {
        self.session.as_ref().expect("session not created")
    }
}
