//! Config file loading

use super::AuditConfig;
use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "REPO_AUDIT_";

/// Load configuration from defaults, a config file, and `REPO_AUDIT_*` environment variables.
///
/// An explicitly provided file must parse. An auto-discovered file that fails to parse is
/// reported and ignored.
pub fn load_config(search_dir: &Path, config_path: Option<&Path>) -> Result<AuditConfig> {
    let config_path_provided = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(search_dir),
    };

    let Some(config_file) = discovered else {
        return extract(base_figment()).context("Invalid configuration in environment");
    };

    match extract(with_file(base_figment(), &config_file)?) {
        Ok(cfg) => Ok(cfg),
        Err(e) if config_path_provided => {
            Err(e).with_context(|| format!("Invalid config file: {}", config_file.display()))
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse auto-discovered config {}: {}",
                config_file.display(),
                e
            );
            extract(base_figment()).context("Invalid configuration in environment")
        }
    }
}

fn base_figment() -> Figment {
    Figment::from(Serialized::defaults(AuditConfig::default()))
}

fn with_file(figment: Figment, config_file: &Path) -> Result<Figment> {
    if !config_file.exists() {
        anyhow::bail!("Config file not found: {}", config_file.display());
    }

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let figment = match ext.as_str() {
        "toml" => figment.merge(Toml::file(config_file)),
        "yaml" | "yml" => figment.merge(Yaml::file(config_file)),
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    };
    Ok(figment)
}

fn extract(figment: Figment) -> Result<AuditConfig> {
    let cfg = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract::<AuditConfig>()?;
    Ok(cfg)
}

fn discover_config(search_dir: &Path) -> Option<PathBuf> {
    let candidates = [
        "repo-audit.toml",
        ".repo-audit.toml",
        "repo-audit.yml",
        ".repo-audit.yml",
        "repo-audit.yaml",
        ".repo-audit.yaml",
    ];

    candidates.iter().map(|c| search_dir.join(c)).find(|p| p.exists())
}
