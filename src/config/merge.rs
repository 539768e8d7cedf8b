//! Merge CLI flags over loaded configuration.

use super::{normalize_extension, AuditConfig};

/// Values supplied on the command line. `None` means "keep the configured value".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub max_chunk_chars: Option<usize>,
    pub max_files: Option<usize>,
    pub include_extensions: Option<Vec<String>>,
    pub exclude_globs: Option<Vec<String>>,
    pub model_id: Option<String>,
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub github_token: Option<String>,
}

pub fn merge_cli_with_config(mut config: AuditConfig, overrides: CliOverrides) -> AuditConfig {
    if let Some(max) = overrides.max_chunk_chars {
        config.max_chunk_chars = max;
    }
    if overrides.max_files.is_some() {
        config.max_files = overrides.max_files;
    }
    if let Some(exts) = overrides.include_extensions {
        config.include_extensions = exts.iter().filter_map(|e| normalize_extension(e)).collect();
    }
    if let Some(globs) = overrides.exclude_globs {
        config.exclude_globs = globs;
    }
    if let Some(model) = overrides.model_id {
        config.model_id = model;
    }
    if overrides.api_key.is_some() {
        config.api_key = overrides.api_key;
    }
    if overrides.project_id.is_some() {
        config.project_id = overrides.project_id;
    }
    if overrides.github_token.is_some() {
        config.github_token = overrides.github_token;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_win() {
        let merged = merge_cli_with_config(
            AuditConfig::default(),
            CliOverrides {
                max_chunk_chars: Some(42),
                include_extensions: Some(vec![".RS".to_string(), "py".to_string()]),
                api_key: Some("key".to_string()),
                ..CliOverrides::default()
            },
        );
        assert_eq!(merged.max_chunk_chars, 42);
        assert_eq!(merged.include_extensions, vec!["rs", "py"]);
        assert_eq!(merged.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let base = AuditConfig { project_id: Some("p".to_string()), ..AuditConfig::default() };
        let merged = merge_cli_with_config(base.clone(), CliOverrides::default());
        assert_eq!(merged, base);
    }
}
