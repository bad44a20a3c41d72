//! Document URI to filesystem path conversion.

use camino::Utf8PathBuf;
use lsp_types::Uri;
use url::Url;

/// Converts a `file://` document URI to a UTF-8 path.
///
/// Returns `None` for other schemes and for paths that are not valid UTF-8,
/// since such documents cannot belong to a project on disk.
#[must_use]
pub fn uri_to_path(uri: &Uri) -> Option<Utf8PathBuf> {
    let url = Url::parse(uri.as_str()).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    let path = url.to_file_path().ok()?;
    Utf8PathBuf::try_from(path).ok()
}
