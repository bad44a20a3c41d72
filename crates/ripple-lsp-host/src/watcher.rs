//! File-watch registration armed by the `initialized` notification.

use std::collections::BTreeSet;

use lsp_types::Registration;
use serde_json::json;
use tracing::debug;

/// Identity of the first watched-files registration.
pub const WATCH_REGISTRATION_ID: &str = "ripple-lsp/watched-files";

/// Method registered through `client/registerCapability`.
pub const WATCHED_FILES_METHOD: &str = "workspace/didChangeWatchedFiles";

const WATCHER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::watcher");

/// Tracks the glob patterns already registered with the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileWatcher {
    patterns: BTreeSet<String>,
    registrations: usize,
}

impl FileWatcher {
    /// Builds a watcher with nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a registration covering the patterns not yet watched.
    ///
    /// Returns `None` when every pattern is already registered, so repeated
    /// calls have no visible effect.
    pub fn watch_files<I, S>(&mut self, patterns: I) -> Option<Registration>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fresh: Vec<String> = patterns
            .into_iter()
            .map(Into::into)
            .filter(|pattern| self.patterns.insert(pattern.clone()))
            .collect();
        if fresh.is_empty() {
            debug!(target: WATCHER_TARGET, "watch patterns already registered");
            return None;
        }

        self.registrations += 1;
        let id = match self.registrations {
            1 => WATCH_REGISTRATION_ID.to_owned(),
            count => format!("{WATCH_REGISTRATION_ID}/{count}"),
        };
        debug!(target: WATCHER_TARGET, id = %id, patterns = ?fresh, "registering file watch");
        let watchers: Vec<_> = fresh
            .iter()
            .map(|pattern| json!({ "globPattern": pattern }))
            .collect();

        Some(Registration {
            id,
            method: WATCHED_FILES_METHOD.to_owned(),
            register_options: Some(json!({ "watchers": watchers })),
        })
    }

    /// Patterns registered so far.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }
}
