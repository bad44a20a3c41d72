//! TypeScript SDK loading and localized diagnostic messages.

use std::collections::BTreeMap;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ripple_config::DEFAULT_LOCALE;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::LoadError;
use crate::module::{ModuleHandle, ModuleLoader, PackageManifest};

const SDK_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::sdk");

/// Entry module inside a TypeScript SDK `lib` directory.
const TYPESCRIPT_ENTRY: &str = "typescript.js";

/// File name of a localized message table inside `<tsdk>/<locale>/`.
const DIAGNOSTIC_MESSAGES: &str = "diagnosticMessages.generated.json";

/// Oldest TypeScript major version the service plugins support.
const MINIMUM_MAJOR_VERSION: u64 = 4;

/// A loaded TypeScript toolchain installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeScriptSdk {
    root: Utf8PathBuf,
    module: ModuleHandle,
    version: Option<String>,
}

impl TypeScriptSdk {
    /// Directory the SDK was loaded from.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        self.root.as_path()
    }

    /// Handle for `typescript.js`.
    #[must_use]
    pub const fn module(&self) -> &ModuleHandle {
        &self.module
    }

    /// Version declared by the SDK package, when known.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Diagnostic message table for the negotiated locale.
///
/// English uses the messages compiled into the SDK, so no table is loaded for
/// it; [`DiagnosticMessages::get`] then returns `None` for every key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessages {
    locale: String,
    table: Option<Arc<BTreeMap<String, String>>>,
}

impl DiagnosticMessages {
    /// The built-in English messages.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_owned(),
            table: None,
        }
    }

    /// A localized table.
    #[must_use]
    pub fn localized(locale: impl Into<String>, table: BTreeMap<String, String>) -> Self {
        Self {
            locale: locale.into(),
            table: Some(Arc::new(table)),
        }
    }

    /// Locale the messages are in.
    #[must_use]
    pub const fn locale(&self) -> &str {
        self.locale.as_str()
    }

    /// Whether these are the SDK's built-in English messages.
    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        self.table.is_none()
    }

    /// Looks up a localized message by its key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.table
            .as_ref()
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }

    /// Number of localized messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.as_ref().map_or(0, |table| table.len())
    }

    /// Whether no localized messages were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// SDK handle together with the messages for the requested locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSdk {
    /// The SDK itself.
    pub typescript: TypeScriptSdk,
    /// Diagnostic messages for the negotiated locale.
    pub diagnostic_messages: DiagnosticMessages,
}

/// Loads the TypeScript SDK at `tsdk` and its messages for `locale`.
///
/// Message tables are best effort: a missing or unreadable table falls back
/// to the primary language subtag and then to the built-in English messages
/// without failing.
///
/// # Errors
///
/// Returns a [`LoadError`] when `typescript.js` cannot be loaded or the SDK
/// is older than TypeScript 4.
pub fn load_tsdk(
    loader: &dyn ModuleLoader,
    tsdk: &Utf8Path,
    locale: &str,
) -> Result<LoadedSdk, LoadError> {
    let module = loader.load(&tsdk.join(TYPESCRIPT_ENTRY))?;
    let version = read_version(loader, tsdk)?;
    let typescript = TypeScriptSdk {
        root: tsdk.to_path_buf(),
        module,
        version,
    };
    let diagnostic_messages = load_messages(loader, tsdk, locale);
    debug!(
        target: SDK_TARGET,
        tsdk = %tsdk,
        version = typescript.version().unwrap_or("unknown"),
        locale = diagnostic_messages.locale(),
        "loaded TypeScript SDK"
    );
    Ok(LoadedSdk {
        typescript,
        diagnostic_messages,
    })
}

/// Package name the SDK's `package.json` must carry for its version to count.
const TYPESCRIPT_PACKAGE: &str = "typescript";

/// Reads the version from the package that owns the `lib` directory.
///
/// A parent manifest belonging to any other package says nothing about the
/// SDK, so its version is ignored.
fn read_version(loader: &dyn ModuleLoader, tsdk: &Utf8Path) -> Result<Option<String>, LoadError> {
    let Some(package_dir) = tsdk.parent() else {
        return Ok(None);
    };
    let manifest_path = package_dir.join("package.json");
    let value = match loader.load_json(&manifest_path) {
        Ok(value) => value,
        Err(error) => {
            debug!(target: SDK_TARGET, %error, "TypeScript package manifest unavailable");
            return Ok(None);
        }
    };
    let Ok(manifest) = PackageManifest::deserialize(value) else {
        return Ok(None);
    };
    if manifest.name.as_deref() != Some(TYPESCRIPT_PACKAGE) {
        debug!(
            target: SDK_TARGET,
            manifest = %manifest_path,
            name = manifest.name.as_deref().unwrap_or("unnamed"),
            "parent manifest is not the TypeScript package"
        );
        return Ok(None);
    }
    let Some(version) = manifest.version else {
        return Ok(None);
    };

    match major_version(&version) {
        Some(major) if major < MINIMUM_MAJOR_VERSION => Err(LoadError::Incompatible {
            path: tsdk.to_path_buf(),
            message: format!(
                "TypeScript {version} is not supported; {MINIMUM_MAJOR_VERSION}.0 or newer is required"
            ),
        }),
        _ => Ok(Some(version)),
    }
}

fn major_version(version: &str) -> Option<u64> {
    version.split('.').next()?.trim().parse().ok()
}

fn load_messages(loader: &dyn ModuleLoader, tsdk: &Utf8Path, locale: &str) -> DiagnosticMessages {
    for candidate in locale_candidates(locale) {
        let path = tsdk.join(&candidate).join(DIAGNOSTIC_MESSAGES);
        let value = match loader.load_json(&path) {
            Ok(value) => value,
            Err(LoadError::NotFound { .. }) => continue,
            Err(error) => {
                warn!(target: SDK_TARGET, %error, "ignoring unreadable message table");
                continue;
            }
        };
        match BTreeMap::<String, String>::deserialize(value) {
            Ok(table) => return DiagnosticMessages::localized(candidate, table),
            Err(error) => {
                warn!(
                    target: SDK_TARGET,
                    path = %path,
                    %error,
                    "ignoring malformed message table"
                );
            }
        }
    }
    DiagnosticMessages::builtin()
}

/// Directories to probe for a locale, most specific first.
///
/// English never needs a table, so it yields no candidates.
fn locale_candidates(locale: &str) -> Vec<String> {
    let normalised = locale.trim().to_ascii_lowercase();
    let primary = normalised
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_owned();
    if primary.is_empty() || primary == DEFAULT_LOCALE {
        return Vec::new();
    }

    let mut candidates = vec![normalised.replace('_', "-")];
    if candidates.first().is_some_and(|full| *full != primary) {
        candidates.push(primary);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::test_support::InMemoryModuleLoader;

    fn sdk_loader() -> InMemoryModuleLoader {
        InMemoryModuleLoader::default()
            .with_module("/opt/ts/lib/typescript.js")
            .with_json(
                "/opt/ts/package.json",
                json!({ "name": "typescript", "version": "5.6.3" }),
            )
            .with_json(
                "/opt/ts/lib/fr/diagnosticMessages.generated.json",
                json!({ "Unterminated_string_literal_1002": "Littéral de chaîne non terminé." }),
            )
            .with_json(
                "/opt/ts/lib/pt-br/diagnosticMessages.generated.json",
                json!({ "Unterminated_string_literal_1002": "Literal de cadeia de caracteres não finalizado." }),
            )
    }

    #[rstest]
    #[case("en", Vec::new())]
    #[case("EN-us", Vec::new())]
    #[case("", Vec::new())]
    #[case("fr", vec!["fr"])]
    #[case("pt-BR", vec!["pt-br", "pt"])]
    #[case("zh_CN", vec!["zh-cn", "zh"])]
    fn derives_locale_candidates(#[case] locale: &str, #[case] expected: Vec<&str>) {
        assert_eq!(locale_candidates(locale), expected);
    }

    #[rstest]
    fn loads_french_messages() {
        let loaded = load_tsdk(&sdk_loader(), Utf8Path::new("/opt/ts/lib"), "fr")
            .expect("sdk should load");

        assert_eq!(loaded.typescript.version(), Some("5.6.3"));
        assert_eq!(loaded.diagnostic_messages.locale(), "fr");
        assert_eq!(
            loaded
                .diagnostic_messages
                .get("Unterminated_string_literal_1002"),
            Some("Littéral de chaîne non terminé.")
        );
    }

    #[rstest]
    fn prefers_regional_table() {
        let loaded = load_tsdk(&sdk_loader(), Utf8Path::new("/opt/ts/lib"), "pt-BR")
            .expect("sdk should load");

        assert_eq!(loaded.diagnostic_messages.locale(), "pt-br");
    }

    #[rstest]
    #[case("de")]
    #[case("en")]
    fn falls_back_to_builtin_english(#[case] locale: &str) {
        let loaded = load_tsdk(&sdk_loader(), Utf8Path::new("/opt/ts/lib"), locale)
            .expect("sdk should load");

        assert!(loaded.diagnostic_messages.is_builtin());
        assert_eq!(loaded.diagnostic_messages.locale(), DEFAULT_LOCALE);
    }

    #[rstest]
    fn malformed_table_falls_back() {
        let loader = sdk_loader().with_json(
            "/opt/ts/lib/ja/diagnosticMessages.generated.json",
            json!(["not", "a", "table"]),
        );

        let loaded =
            load_tsdk(&loader, Utf8Path::new("/opt/ts/lib"), "ja").expect("sdk should load");

        assert!(loaded.diagnostic_messages.is_builtin());
    }

    #[rstest]
    fn rejects_old_typescript() {
        let loader = sdk_loader().with_json(
            "/opt/ts/package.json",
            json!({ "name": "typescript", "version": "3.9.10" }),
        );

        let error =
            load_tsdk(&loader, Utf8Path::new("/opt/ts/lib"), "en").expect_err("3.x is too old");

        assert!(matches!(error, LoadError::Incompatible { .. }), "got {error:?}");
    }

    #[rstest]
    #[case(json!({ "name": "my-app", "version": "0.1.0" }))]
    #[case(json!({ "version": "1.0.0" }))]
    fn ignores_unrelated_parent_manifest(#[case] manifest: serde_json::Value) {
        let loader = InMemoryModuleLoader::default()
            .with_module("/home/u/proj/tsdk/typescript.js")
            .with_json("/home/u/proj/package.json", manifest);

        let loaded = load_tsdk(&loader, Utf8Path::new("/home/u/proj/tsdk"), "en")
            .expect("sdk inside a project should load");

        assert_eq!(loaded.typescript.version(), None);
        assert_eq!(loaded.typescript.root(), Utf8Path::new("/home/u/proj/tsdk"));
    }

    #[rstest]
    fn missing_entry_module_fails() {
        let error = load_tsdk(&sdk_loader(), Utf8Path::new("/opt/elsewhere"), "en")
            .expect_err("sdk should be missing");

        assert!(error.is_not_found());
    }
}
