use crate::logging::LogFormat;

/// Name reported in `serverInfo` and used as the binary name.
pub const SERVER_NAME: &str = "ripple-lsp";

/// Environment variable consulted when `initializationOptions.ripplePath` is absent.
pub const RIPPLE_COMPILER_PATH_ENV: &str = "RIPPLE_COMPILER_PATH";

/// Environment variable consulted when `initializationOptions.typescript.tsdk` is absent.
pub const TSDK_PATH_ENV: &str = "TSDK_PATH";

/// Locale used for diagnostic messages when the client does not negotiate one.
pub const DEFAULT_LOCALE: &str = "en";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
///
/// Editors surface stderr in an output pane, so the compact format reads
/// better there than JSON.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
