//! Runtime module loading.
//!
//! The compiler, the TypeScript SDK, and the extension modules are only known
//! once the client has sent its options, so they are located at runtime
//! through the narrow [`ModuleLoader`] interface. Production code uses
//! [`FsModuleLoader`]; tests substitute an in-memory implementation.

use std::fs;
use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::LoadError;

const PACKAGE_MANIFEST: &str = "package.json";

/// Subset of `package.json` the server inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    /// Package name.
    #[serde(default)]
    pub name: Option<String>,
    /// Package version.
    #[serde(default)]
    pub version: Option<String>,
    /// Entry point relative to the package directory.
    #[serde(default)]
    pub main: Option<String>,
}

/// A module that has been located and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHandle {
    path: Utf8PathBuf,
    manifest: Option<PackageManifest>,
}

impl ModuleHandle {
    /// Builds a handle for a module without a package manifest.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            manifest: None,
        }
    }

    /// Attaches the package manifest read alongside the module.
    #[must_use]
    pub fn with_manifest(mut self, manifest: PackageManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Resolved location of the module.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        self.path.as_path()
    }

    /// Package manifest, when the module is a package directory.
    #[must_use]
    pub const fn manifest(&self) -> Option<&PackageManifest> {
        self.manifest.as_ref()
    }

    /// Package name, falling back to the file stem of the module path.
    #[must_use]
    pub fn name(&self) -> &str {
        self.manifest
            .as_ref()
            .and_then(|manifest| manifest.name.as_deref())
            .or_else(|| self.path.file_stem())
            .unwrap_or_else(|| self.path.as_str())
    }

    /// Package version when the manifest declares one.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.manifest
            .as_ref()
            .and_then(|manifest| manifest.version.as_deref())
    }
}

/// Locates modules and JSON resources by path.
pub trait ModuleLoader: Send + Sync {
    /// Loads the module at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] when nothing exists at the path and
    /// other [`LoadError`] variants when the module cannot be used.
    fn load(&self, path: &Utf8Path) -> Result<ModuleHandle, LoadError>;

    /// Reads and parses a JSON resource such as a message table.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] when the resource does not exist and
    /// [`LoadError::Malformed`] when it is not valid JSON.
    fn load_json(&self, path: &Utf8Path) -> Result<Value, LoadError>;
}

/// Loads modules from the local filesystem.
///
/// Relative paths are resolved against the base directory, which is the
/// server's working directory in production.
#[derive(Debug, Clone)]
pub struct FsModuleLoader {
    base_dir: Utf8PathBuf,
}

impl FsModuleLoader {
    /// Builds a loader resolving relative paths against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Builds a loader rooted at the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the working directory cannot be read or is
    /// not valid UTF-8.
    pub fn from_current_dir() -> io::Result<Self> {
        let cwd = std::env::current_dir()?;
        let base_dir = Utf8PathBuf::from_path_buf(cwd).map_err(|path| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("working directory '{}' is not valid UTF-8", path.display()),
            )
        })?;
        Ok(Self::new(base_dir))
    }

    /// Resolves `path` against the base directory.
    #[must_use]
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn load_package(&self, dir: Utf8PathBuf) -> Result<ModuleHandle, LoadError> {
        let manifest_path = dir.join(PACKAGE_MANIFEST);
        let manifest = match self.load_json(&manifest_path) {
            Ok(value) => PackageManifest::deserialize(value).map_err(|error| {
                LoadError::Malformed {
                    path: manifest_path.clone(),
                    message: error.to_string(),
                }
            })?,
            Err(LoadError::NotFound { .. }) => return Ok(ModuleHandle::new(dir)),
            Err(other) => return Err(other),
        };

        if let Some(main) = manifest.main.as_deref() {
            let entry = dir.join(main);
            if !entry.exists() {
                return Err(LoadError::Malformed {
                    path: dir,
                    message: format!("entry point '{main}' does not exist"),
                });
            }
        }

        Ok(ModuleHandle::new(dir).with_manifest(manifest))
    }
}

impl ModuleLoader for FsModuleLoader {
    fn load(&self, path: &Utf8Path) -> Result<ModuleHandle, LoadError> {
        let resolved = self.resolve(path);
        let metadata = fs::metadata(&resolved).map_err(|error| io_error(&resolved, error))?;
        if metadata.is_dir() {
            self.load_package(resolved)
        } else {
            Ok(ModuleHandle::new(resolved))
        }
    }

    fn load_json(&self, path: &Utf8Path) -> Result<Value, LoadError> {
        let resolved = self.resolve(path);
        let text = fs::read_to_string(&resolved).map_err(|error| io_error(&resolved, error))?;
        serde_json::from_str(&text).map_err(|error| LoadError::Malformed {
            path: resolved,
            message: error.to_string(),
        })
    }
}

fn io_error(path: &Utf8Path, error: io::Error) -> LoadError {
    if error.kind() == io::ErrorKind::NotFound {
        LoadError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        LoadError::Io {
            path: path.to_path_buf(),
            source: Arc::new(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;

    struct Fixture {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    #[fixture]
    fn workspace() -> Fixture {
        let dir = TempDir::new().expect("temporary directory");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("non UTF-8 temp dir: {}", path.display()));
        Fixture { _dir: dir, root }
    }

    fn write(path: &Utf8Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(path, contents).expect("write fixture file");
    }

    #[rstest]
    fn loads_package_directory_with_manifest(workspace: Fixture) {
        let package = workspace.root.join("ripple");
        write(
            &package.join(PACKAGE_MANIFEST),
            r#"{ "name": "ripple", "version": "0.2.31", "main": "src/compiler/index.js" }"#,
        );
        write(&package.join("src/compiler/index.js"), "export {};");

        let loader = FsModuleLoader::new(workspace.root.clone());
        let handle = loader.load(Utf8Path::new("ripple")).expect("module should load");

        assert_eq!(handle.path(), package);
        assert_eq!(handle.name(), "ripple");
        assert_eq!(handle.version(), Some("0.2.31"));
    }

    #[rstest]
    fn rejects_manifest_with_missing_entry(workspace: Fixture) {
        let package = workspace.root.join("ripple");
        write(
            &package.join(PACKAGE_MANIFEST),
            r#"{ "name": "ripple", "main": "dist/index.js" }"#,
        );

        let loader = FsModuleLoader::new(workspace.root.clone());
        let error = loader.load(&package).expect_err("entry should be missing");

        assert!(matches!(error, LoadError::Malformed { .. }), "got {error:?}");
    }

    #[rstest]
    fn loads_plain_file_without_manifest(workspace: Fixture) {
        let module = workspace.root.join("language.js");
        write(&module, "module.exports = {};");

        let loader = FsModuleLoader::new("/unused");
        let handle = loader.load(&module).expect("module should load");

        assert_eq!(handle.manifest(), None);
        assert_eq!(handle.name(), "language");
    }

    #[rstest]
    fn reports_missing_modules(workspace: Fixture) {
        let loader = FsModuleLoader::new(workspace.root.clone());
        let error = loader
            .load(Utf8Path::new("missing/compiler.js"))
            .expect_err("module should be missing");

        assert!(error.is_not_found());
        assert!(error.to_string().contains("missing/compiler.js"));
    }

    #[rstest]
    fn reports_malformed_json(workspace: Fixture) {
        let table = workspace.root.join("fr/diagnosticMessages.generated.json");
        write(&table, "{ not json");

        let loader = FsModuleLoader::new(workspace.root.clone());
        let error = loader.load_json(&table).expect_err("json should be malformed");

        assert!(matches!(error, LoadError::Malformed { .. }), "got {error:?}");
    }
}
