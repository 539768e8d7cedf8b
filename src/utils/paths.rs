//! Path normalization

/// Convert a repository path to the forward-slash, relative form used in chunk headers.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").trim_start_matches('/').to_string()
}
