//! Repository fetching from a GitHub-compatible source host

use crate::config::AuditConfig;
use crate::error::FetchError;

pub mod github;

pub use github::{parse_repo_url, GitHubFetcher, RepoSlug, RepoSnapshot, BRANCHES};

/// Fetch every allow-listed file of the repository at `repo_url`.
///
/// The tree listing and each raw file are tried on `main` first, then `master`.
pub fn fetch_repository(
    config: &AuditConfig,
    repo_url: &str,
) -> Result<RepoSnapshot, FetchError> {
    GitHubFetcher::new(config)?.fetch_snapshot(repo_url)
}
