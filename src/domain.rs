//! Core data types shared across fetching, chunking, and auditing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute ceiling on a single file's content, in characters.
pub const MAX_FILE_CHARS: usize = 100_000;

/// Default upper bound for a packed chunk, in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 150_000;

/// Appended to file content that was cut at [`MAX_FILE_CHARS`].
pub const TRUNCATION_MARKER: &str = "\n// ... [truncated]";

/// A fetched repository file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Repo-relative, forward-slash separated path.
    pub path: String,
    pub content: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self { path: path.into(), content: content.into() }
    }

    pub fn is_truncated(&self) -> bool {
        self.content.ends_with(TRUNCATION_MARKER)
    }
}

/// Implementation status of a single audited task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Implemented,
    PartiallyImplemented,
    NotImplemented,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Implemented => "implemented",
            TaskStatus::PartiallyImplemented => "partially_implemented",
            TaskStatus::NotImplemented => "not_implemented",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One feature task and the model's current verdict on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub task: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub evidence: String,
}

impl Task {
    pub fn new(
        task_id: impl Into<String>,
        task: impl Into<String>,
        status: TaskStatus,
        evidence: impl Into<String>,
    ) -> Self {
        Self { task_id: task_id.into(), task: task.into(), status, evidence: evidence.into() }
    }
}

/// Inbound audit request, shared by the CLI and the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRequest {
    pub repository_identifier: String,
    pub tasks: Vec<Task>,
}
