//! In-memory collaborators for exercising the handshake without a real
//! Ripple or TypeScript installation.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;

use crate::errors::{InitializeError, LoadError};
use crate::module::{ModuleHandle, ModuleLoader};
use crate::reporter::InitReporter;

/// Module loader backed by maps of known paths.
///
/// Every lookup is recorded so tests can assert that nothing was loaded
/// after a configuration failure.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModuleLoader {
    modules: BTreeMap<Utf8PathBuf, ModuleHandle>,
    resources: BTreeMap<Utf8PathBuf, Value>,
    lookups: Arc<Mutex<Vec<Utf8PathBuf>>>,
}

impl InMemoryModuleLoader {
    /// Registers a module without a manifest.
    #[must_use]
    pub fn with_module(self, path: &str) -> Self {
        let handle = ModuleHandle::new(path);
        self.with_handle(handle)
    }

    /// Registers a fully-specified module handle.
    #[must_use]
    pub fn with_handle(mut self, handle: ModuleHandle) -> Self {
        self.modules.insert(handle.path().to_path_buf(), handle);
        self
    }

    /// Registers a JSON resource.
    #[must_use]
    pub fn with_json(mut self, path: &str, value: Value) -> Self {
        self.resources.insert(Utf8PathBuf::from(path), value);
        self
    }

    /// Paths looked up so far, in order.
    #[must_use]
    pub fn lookups(&self) -> Vec<Utf8PathBuf> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, path: &Utf8Path) {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_path_buf());
    }
}

impl ModuleLoader for InMemoryModuleLoader {
    fn load(&self, path: &Utf8Path) -> Result<ModuleHandle, LoadError> {
        self.record(path);
        self.modules
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn load_json(&self, path: &Utf8Path) -> Result<Value, LoadError> {
        self.record(path);
        self.resources
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                path: path.to_path_buf(),
            })
    }
}

/// Reporter that keeps every reported failure.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    reports: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingReporter {
    /// Reported `(context, message)` pairs, in order.
    #[must_use]
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl InitReporter for RecordingReporter {
    fn report(&self, context: &str, error: &InitializeError) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((context.to_owned(), error.to_string()));
    }
}
