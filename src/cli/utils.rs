//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

use repo_audit::config::{load_config, merge_cli_with_config, AuditConfig, CliOverrides};
use repo_audit::domain::Task;

/// Options every subcommand accepts for building its [`AuditConfig`].
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Path to config file (repo-audit.toml or .repo-audit.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Include only these extensions (comma-separated, e.g., '.rs,.ts')
    #[arg(short = 'i', long, value_name = "EXTS")]
    pub include_ext: Option<String>,

    /// Exclude paths matching these globs (comma-separated)
    #[arg(short = 'e', long, value_name = "GLOBS")]
    pub exclude_glob: Option<String>,

    /// Maximum characters per chunk sent to the model
    #[arg(long, value_name = "CHARS")]
    pub max_chunk_chars: Option<usize>,

    /// Fetch at most this many files
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Generation model identifier
    #[arg(long, value_name = "MODEL")]
    pub model_id: Option<String>,

    /// API key exchanged for a bearer token
    #[arg(long, env = "WATSONX_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Project the generation requests are billed to
    #[arg(long, env = "WATSONX_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Token for the source host API (raises rate limits, reaches private repos)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
}

impl ConfigArgs {
    /// Load file and environment configuration, then apply these flags over it.
    pub fn resolve(&self) -> Result<AuditConfig> {
        let search_dir = std::env::current_dir().context("Failed to read current directory")?;
        let file_config = load_config(&search_dir, self.config.as_deref())?;

        let overrides = CliOverrides {
            max_chunk_chars: self.max_chunk_chars,
            max_files: self.max_files,
            include_extensions: parse_csv(&self.include_ext),
            exclude_globs: parse_csv(&self.exclude_glob),
            model_id: self.model_id.clone(),
            api_key: self.api_key.clone(),
            project_id: self.project_id.clone(),
            github_token: self.github_token.clone(),
        };
        Ok(merge_cli_with_config(file_config, overrides))
    }
}

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Read the initial task array from a JSON file.
pub fn read_tasks(path: &Path) -> Result<Vec<Task>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tasks file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Tasks file is not a JSON array of tasks: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_audit::domain::TaskStatus;

    #[test]
    fn test_parse_csv_trims_and_skips_empty() {
        let parsed = parse_csv(&Some(" rs, ,ts ,".to_string()));
        assert_eq!(parsed, Some(vec!["rs".to_string(), "ts".to_string()]));
        assert_eq!(parse_csv(&None), None);
    }

    #[test]
    fn test_read_tasks() {
        let tmp = tempfile::tempdir().expect("tmp");
        let path = tmp.path().join("tasks.json");
        fs::write(&path, r#"[{"task_id":"1","task":"Has CI","status":"not_implemented"}]"#)
            .expect("write");

        let tasks = read_tasks(&path).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::NotImplemented);
        assert_eq!(tasks[0].evidence, "");
    }

    #[test]
    fn test_read_tasks_rejects_non_array() {
        let tmp = tempfile::tempdir().expect("tmp");
        let path = tmp.path().join("tasks.json");
        fs::write(&path, r#"{"tasks":[]}"#).expect("write");

        let err = read_tasks(&path).unwrap_err();
        assert!(err.to_string().contains("not a JSON array"));
    }
}
