//! Maps request URIs onto the filesystem under the document root.

use std::fs::Metadata;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::handlers::error::ServeError;

/// What a resolved path points at, and how it will be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Directory,
    /// Regular file with an execute bit: run as CGI
    Executable,
    /// Regular file that is readable but not executable: served as-is
    Readable,
}

/// Percent-decodes `uri`, joins it onto `root` and canonicalizes the result.
///
/// `root` must already be canonical. Anything that fails to canonicalize or
/// lands outside the root is `NotFound`.
pub async fn resolve_path(root: &Path, uri: &str) -> Result<PathBuf, ServeError> {
    let decoded = urlencoding::decode(uri)
        .map_err(|e| ServeError::MalformedRequest(format!("{uri}: {e}")))?;
    let joined = root.join(decoded.trim_start_matches('/'));

    let path = tokio::fs::canonicalize(&joined)
        .await
        .map_err(|e| ServeError::NotFound(format!("{uri}: {e}")))?;

    if !path.starts_with(root) {
        return Err(ServeError::NotFound(format!("{uri}: outside document root")));
    }

    Ok(path)
}

/// Decides how `path` is served from its metadata.
///
/// Execute permission wins over read permission, so an executable that is
/// also readable runs as CGI.
pub async fn classify(path: &Path) -> Result<Resource, ServeError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| ServeError::NotFound(format!("{}: {e}", path.display())))?;

    classify_metadata(&meta).ok_or_else(|| {
        if meta.is_file() {
            ServeError::Forbidden(format!("{}: neither readable nor executable", path.display()))
        } else {
            ServeError::NotFound(format!("{}: not a file or directory", path.display()))
        }
    })
}

fn classify_metadata(meta: &Metadata) -> Option<Resource> {
    if meta.is_dir() {
        return Some(Resource::Directory);
    }
    if !meta.is_file() {
        return None;
    }

    let mode = meta.permissions().mode();
    if mode & 0o111 != 0 {
        Some(Resource::Executable)
    } else if mode & 0o444 != 0 {
        Some(Resource::Readable)
    } else {
        None
    }
}
