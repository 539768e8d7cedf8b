//! Configuration loading and merging
//!
//! Handles loading from config files, environment variables, and CLI arguments
//! with proper precedence (CLI > Env > File > Defaults).

use crate::domain::{DEFAULT_MAX_CHUNK_CHARS, MAX_FILE_CHARS};
use serde::{Deserialize, Deserializer, Serialize};

pub mod loader;
pub mod merge;

pub use loader::load_config;
pub use merge::{merge_cli_with_config, CliOverrides};

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_GENERATION_URL: &str =
    "https://us-south.ml.cloud.ibm.com/ml/v1/text/generation?version=2023-05-29";
pub const DEFAULT_MODEL_ID: &str = "meta-llama/llama-3-3-70b-instruct";

pub fn default_include_extensions() -> &'static [&'static str] {
    &[
        "js", "ts", "jsx", "tsx", "py", "java", "go", "rs", "md", "json", "html", "css", "rb",
        "php", "c", "cpp", "h", "hpp", "cs", "kt", "swift", "scala", "sh", "yml", "yaml", "toml",
        "xml", "sql", "vue", "svelte",
    ]
}

/// Everything an audit run needs, passed explicitly into the fetcher and model clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub max_chunk_chars: usize,
    pub max_file_chars: usize,
    #[serde(deserialize_with = "extensions_from_string_or_list")]
    pub include_extensions: Vec<String>,
    #[serde(deserialize_with = "globs_from_string_or_list")]
    pub exclude_globs: Vec<String>,
    pub max_files: Option<usize>,

    pub github_api_base: String,
    pub raw_content_base: String,
    pub github_token: Option<String>,

    pub iam_url: String,
    pub generation_url: String,
    pub model_id: String,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub generation: GenerationParams,

    pub http_timeout_secs: u64,
    pub llm_timeout_secs: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            max_file_chars: MAX_FILE_CHARS,
            include_extensions: default_include_extensions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_globs: Vec::new(),
            max_files: None,
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            raw_content_base: DEFAULT_RAW_CONTENT_BASE.to_string(),
            github_token: None,
            iam_url: DEFAULT_IAM_URL.to_string(),
            generation_url: DEFAULT_GENERATION_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            project_id: None,
            api_key: None,
            generation: GenerationParams::default(),
            http_timeout_secs: 60,
            llm_timeout_secs: 300,
        }
    }
}

/// Decoding parameters forwarded verbatim to the generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub decoding_method: String,
    pub max_new_tokens: u32,
    pub min_new_tokens: u32,
    pub stop_sequences: Vec<String>,
    pub repetition_penalty: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            decoding_method: "greedy".to_string(),
            max_new_tokens: 4000,
            min_new_tokens: 0,
            stop_sequences: Vec::new(),
            repetition_penalty: 1.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<String>),
}

impl StringOrList {
    fn into_items(self) -> Vec<String> {
        match self {
            StringOrList::String(s) => s.split(',').map(str::to_string).collect(),
            StringOrList::List(items) => items,
        }
    }
}

/// Accepts `"py, .js"` or `["py", ".js"]`; yields lowercase extensions without the dot.
fn extensions_from_string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = StringOrList::deserialize(deserializer)?;
    Ok(raw.into_items().iter().filter_map(|item| normalize_extension(item)).collect())
}

fn globs_from_string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = StringOrList::deserialize(deserializer)?;
    Ok(raw
        .into_items()
        .into_iter()
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .collect())
}

pub fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}
