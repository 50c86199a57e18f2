//! Path helpers for layer discovery.

use crate::ConfigError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Canonicalize a path; a path that does not exist yet is kept as given.
pub(super) fn normalize_path(path: &Path) -> Result<PathBuf, ConfigError> {
    path.canonicalize().or_else(|err| match err.kind() {
        ErrorKind::NotFound => Ok(path.to_path_buf()),
        _ => Err(ConfigError::read(path, err)),
    })
}

/// Key used to skip a file reached through two layers (e.g. cwd == project root).
pub(super) fn unique_path(path: &Path) -> PathBuf {
    normalize_path(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Nearest ancestor of `cwd` (inclusive) holding one of the markers.
pub(super) fn find_project_root(cwd: &Path, markers: &[String]) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| markers.iter().any(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
}
