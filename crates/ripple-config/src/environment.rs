//! Immutable snapshot of the environment variables the server consults.

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};

use crate::defaults::{RIPPLE_COMPILER_PATH_ENV, TSDK_PATH_ENV};

/// Environment variables captured once at startup.
///
/// Resolution reads from the snapshot rather than the live process
/// environment, which keeps it a pure function of its inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    vars: BTreeMap<String, OsString>,
}

impl EnvironmentSnapshot {
    /// Captures the fallback variables from the current process environment.
    #[must_use]
    pub fn capture() -> Self {
        Self::from_vars(
            [RIPPLE_COMPILER_PATH_ENV, TSDK_PATH_ENV]
                .into_iter()
                .filter_map(|key| env::var_os(key).map(|value| (key, value))),
        )
    }

    /// Builds a snapshot from explicit key/value pairs.
    #[must_use]
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OsString>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Returns the raw value of a variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(key).map(OsString::as_os_str)
    }

    /// Returns the value of a variable when it is set, valid UTF-8, and
    /// non-empty.
    #[must_use]
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(OsStr::to_str)
            .filter(|value| !value.is_empty())
    }
}
