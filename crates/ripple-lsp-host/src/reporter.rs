//! Operator-facing reporting of fatal initialization failures.

use std::sync::Arc;

use tracing::error;

use crate::errors::InitializeError;

/// Tag prefixed to every reported failure.
pub const LOG_TAG: &str = "[Ripple LSP]";

const REPORTER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::reporter");

/// Sink for fatal initialization failures.
///
/// Reports are advisory; the error itself still travels back to the client.
pub trait InitReporter: Send + Sync {
    /// Records `error` raised while handling `context`.
    fn report(&self, context: &str, error: &InitializeError);
}

impl<T> InitReporter for Arc<T>
where
    T: InitReporter + ?Sized,
{
    fn report(&self, context: &str, error: &InitializeError) {
        (**self).report(context, error);
    }
}

/// Reporter writing through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl InitReporter for TracingReporter {
    fn report(&self, context: &str, error: &InitializeError) {
        error!(
            target: REPORTER_TARGET,
            error = %error,
            "{LOG_TAG} {context}: {error}"
        );
    }
}
