//! File classification helpers for detecting lock files and allow-listed extensions.

use std::path::Path;

/// Substrings that mark a dependency lock file anywhere in the path.
const LOCK_MARKERS: &[&str] = &["package-lock", "yarn.lock"];

/// Check if a file is a dependency lock file.
///
/// # Arguments
/// * `path` - Repo-relative path to check
///
/// # Returns
/// `true` if the path contains a lock marker or the filename is a known lock file
pub fn is_lock_file(path: &str) -> bool {
    let lower = path.to_lowercase();
    if LOCK_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return true;
    }

    let name = Path::new(&lower).file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();
    matches!(
        name.as_str(),
        "pnpm-lock.yaml"
            | "poetry.lock"
            | "pipfile.lock"
            | "cargo.lock"
            | "gemfile.lock"
            | "composer.lock"
            | "go.sum"
    )
}

/// Check whether the path's extension is in `allowed` (lowercase, no leading dot).
pub fn has_allowed_extension(path: &str, allowed: &[String]) -> bool {
    let ext = Path::new(path).extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
    !ext.is_empty() && allowed.iter().any(|a| *a == ext)
}
