//! GitHub repository fetching over the REST tree API and raw content host

use crate::config::AuditConfig;
use crate::domain::{FileRecord, TRUNCATION_MARKER};
use crate::error::FetchError;
use crate::utils::{
    has_allowed_extension, http_client, is_lock_file, normalize_path, truncate_chars,
};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

/// Branches tried, in order, for both tree listing and raw content.
pub const BRANCHES: [&str; 2] = ["main", "master"];

/// Owner and repository name parsed from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

/// Parse `https://<host>/<owner>/<repo>` (trailing slash, `.git`, and extra path allowed).
///
/// Examples:
/// - `https://github.com/owner/repo`          → `owner/repo`
/// - `https://github.com/owner/repo.git`      → `owner/repo`
/// - `github.com/owner/repo/tree/dev`         → `owner/repo`
pub fn parse_repo_url(identifier: &str) -> Result<RepoSlug, FetchError> {
    let trimmed = identifier.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url =
        Url::parse(&with_scheme).map_err(|_| FetchError::InvalidRepoUrl(identifier.to_string()))?;
    let mut segments = url.path_segments().into_iter().flatten().filter(|s| !s.is_empty());

    let owner = segments.next();
    let repo = segments.next().map(|r| r.trim_end_matches(".git"));
    match (owner, repo) {
        (Some(owner), Some(repo)) if !repo.is_empty() => {
            Ok(RepoSlug { owner: owner.to_string(), repo: repo.to_string() })
        }
        _ => Err(FetchError::InvalidRepoUrl(identifier.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Files fetched from one repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoSnapshot {
    pub files: Vec<FileRecord>,
    /// The host returned a partial tree; files past the cut are missing.
    pub tree_truncated: bool,
}

/// Fetches every allow-listed file of a repository.
pub struct GitHubFetcher {
    client: Client,
    api_base: String,
    raw_base: String,
    token: Option<String>,
    include_extensions: Vec<String>,
    exclude_globs: GlobSet,
    max_files: Option<usize>,
    max_file_chars: usize,
}

impl GitHubFetcher {
    pub fn new(config: &AuditConfig) -> Result<Self, FetchError> {
        let client = http_client(
            config.http_timeout_secs,
            &[config.github_api_base.as_str(), config.raw_content_base.as_str()],
        )
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            api_base: config.github_api_base.trim_end_matches('/').to_string(),
            raw_base: config.raw_content_base.clone(),
            token: config.github_token.clone().filter(|t| !t.is_empty()),
            include_extensions: config.include_extensions.clone(),
            exclude_globs: build_globset(&config.exclude_globs),
            max_files: config.max_files,
            max_file_chars: config.max_file_chars,
        })
    }

    /// Fetch `(path, content)` for every selected file, in tree order.
    ///
    /// Only an unreachable tree is fatal; individual files that cannot be fetched on either
    /// branch get an inline error marker as their content.
    pub fn fetch(&self, repo_identifier: &str) -> Result<Vec<FileRecord>, FetchError> {
        self.fetch_snapshot(repo_identifier).map(|snapshot| snapshot.files)
    }

    /// Like [`fetch`](Self::fetch), also reporting whether the host cut the tree listing short.
    pub fn fetch_snapshot(&self, repo_identifier: &str) -> Result<RepoSnapshot, FetchError> {
        let slug = parse_repo_url(repo_identifier)?;
        let listing = self.fetch_tree(&slug)?;
        let entries = listing.tree;
        let mut paths = self.select_paths(&entries);

        if let Some(max) = self.max_files {
            if paths.len() > max {
                tracing::warn!("Limiting audit to the first {} of {} files", max, paths.len());
                paths.truncate(max);
            }
        }

        tracing::info!(
            "Fetching {} files from {}/{} ({} tree entries)",
            paths.len(),
            slug.owner,
            slug.repo,
            entries.len()
        );

        let files = paths
            .par_iter()
            .map(|path| FileRecord::new(normalize_path(path), self.fetch_content(&slug, path)))
            .collect();
        Ok(RepoSnapshot { files, tree_truncated: listing.truncated })
    }

    /// Blobs with an allowed extension that are neither lock files nor excluded.
    pub fn select_paths(&self, entries: &[TreeEntry]) -> Vec<String> {
        entries
            .iter()
            .filter(|e| e.kind == "blob")
            .filter(|e| has_allowed_extension(&e.path, &self.include_extensions))
            .filter(|e| !is_lock_file(&e.path))
            .filter(|e| !self.exclude_globs.is_match(&e.path))
            .map(|e| e.path.clone())
            .collect()
    }

    fn fetch_tree(&self, slug: &RepoSlug) -> Result<TreeResponse, FetchError> {
        let mut last_error = String::new();
        for branch in BRANCHES {
            match self.fetch_tree_on(slug, branch) {
                Ok(tree) => {
                    if tree.truncated {
                        tracing::warn!("Tree listing for {}/{} was truncated", slug.owner, slug.repo);
                    }
                    tracing::debug!("Using branch {} for {}/{}", branch, slug.owner, slug.repo);
                    return Ok(tree);
                }
                Err(e) => {
                    tracing::debug!("Tree listing on {} failed: {:#}", branch, e);
                    last_error = format!("{e:#}");
                }
            }
        }

        Err(FetchError::TreeUnavailable {
            owner: slug.owner.clone(),
            repo: slug.repo.clone(),
            message: last_error,
        })
    }

    fn fetch_tree_on(&self, slug: &RepoSlug, branch: &str) -> Result<TreeResponse> {
        let url =
            format!("{}/repos/{}/{}/git/trees/{}", self.api_base, slug.owner, slug.repo, branch);
        let mut request = self
            .client
            .get(&url)
            .query(&[("recursive", "1")])
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().with_context(|| format!("Request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("{url} returned HTTP {status}");
        }
        response.json().with_context(|| format!("Invalid tree listing from {url}"))
    }

    fn fetch_content(&self, slug: &RepoSlug, path: &str) -> String {
        for branch in BRANCHES {
            match self.fetch_raw(slug, branch, path) {
                Ok(text) => return truncate_chars(&text, self.max_file_chars, TRUNCATION_MARKER),
                Err(e) => tracing::debug!("Raw fetch of {} on {} failed: {:#}", path, branch, e),
            }
        }

        tracing::warn!("Could not fetch {} on any branch", path);
        format!("// Error fetching file content: {path}")
    }

    fn fetch_raw(&self, slug: &RepoSlug, branch: &str, path: &str) -> Result<String> {
        let url = raw_url(&self.raw_base, slug, branch, path)?;
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().with_context(|| format!("Request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("{url} returned HTTP {status}");
        }
        response.text().with_context(|| format!("Failed reading body from {url}"))
    }
}

/// `{raw_base}/{owner}/{repo}/{branch}/{path}` with each path segment percent-encoded.
fn raw_url(raw_base: &str, slug: &RepoSlug, branch: &str, path: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw_base).with_context(|| format!("Invalid raw content base: {raw_base}"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Raw content base cannot carry a path: {raw_base}"))?
        .pop_if_empty()
        .push(&slug.owner)
        .push(&slug.repo)
        .push(branch)
        .extend(path.split('/'));
    Ok(url)
}

fn build_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!("Ignoring invalid exclude glob {}: {}", pattern, e),
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}
