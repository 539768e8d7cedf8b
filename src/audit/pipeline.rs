//! End-to-end audit: fetch, pack, authorize, fold.

use super::reducer::{reduce_with_observer, StepOutcome, StepReport};
use crate::chunk::{pack, ChunkPlan};
use crate::config::AuditConfig;
use crate::domain::{AuditRequest, FileRecord, Task};
use crate::error::AuditError;
use crate::fetch::fetch_repository;
use crate::llm::{IamTokenProvider, TextGenerator, WatsonxClient};

/// Anything that can answer an [`AuditRequest`]; the HTTP server is generic over this.
pub trait AuditService: Send + Sync {
    fn audit(&self, request: &AuditRequest) -> Result<Vec<Task>, AuditError>;
}

/// Fetched files and the chunks packed from them.
#[derive(Debug, Clone)]
pub struct PreparedAudit {
    pub files: Vec<FileRecord>,
    pub chunks: Vec<String>,
    pub max_chunk_chars: usize,
    pub tree_truncated: bool,
}

impl PreparedAudit {
    pub fn plan(&self) -> ChunkPlan {
        ChunkPlan::new(&self.files, &self.chunks, self.max_chunk_chars)
            .with_tree_truncated(self.tree_truncated)
    }
}

pub struct Auditor {
    config: AuditConfig,
}

impl Auditor {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Fetch the repository and pack it. A fetch failure aborts the audit.
    pub fn prepare(&self, repo_url: &str) -> Result<PreparedAudit, AuditError> {
        let snapshot = fetch_repository(&self.config, repo_url)?;
        let chunks = pack(&snapshot.files, self.config.max_chunk_chars);
        tracing::info!("Prepared {} chunks from {} files", chunks.len(), snapshot.files.len());
        Ok(PreparedAudit {
            files: snapshot.files,
            chunks,
            max_chunk_chars: self.config.max_chunk_chars,
            tree_truncated: snapshot.tree_truncated,
        })
    }

    pub fn run(&self, request: &AuditRequest) -> Result<Vec<Task>, AuditError> {
        self.run_with_observer(request, |_| {})
    }

    /// Audit against the configured watsonx backend. One token is fetched per run, and only
    /// when there is at least one chunk to send.
    pub fn run_with_observer<F>(
        &self,
        request: &AuditRequest,
        observer: F,
    ) -> Result<Vec<Task>, AuditError>
    where
        F: FnMut(&StepReport),
    {
        let prepared = self.prepare(&request.repository_identifier)?;
        // Nothing to send, so credentials are never checked for an empty repository.
        if prepared.chunks.is_empty() {
            tracing::info!("No auditable files found; returning tasks unchanged");
            return Ok(request.tasks.clone());
        }

        let token = IamTokenProvider::new(&self.config)?.fetch_token()?;
        let client = WatsonxClient::new(&self.config, token)?;
        fold(&prepared.chunks, &request.tasks, &client, observer)
    }

    /// Audit with a caller-supplied generator instead of the configured backend.
    pub fn run_with<G, F>(
        &self,
        request: &AuditRequest,
        generator: &G,
        observer: F,
    ) -> Result<Vec<Task>, AuditError>
    where
        G: TextGenerator + ?Sized,
        F: FnMut(&StepReport),
    {
        let prepared = self.prepare(&request.repository_identifier)?;
        fold(&prepared.chunks, &request.tasks, generator, observer)
    }
}

/// Run the fold, failing the audit when not a single model call succeeded.
///
/// Parse failures and partial call failures still pass the state through.
fn fold<G, F>(
    chunks: &[String],
    tasks: &[Task],
    generator: &G,
    mut observer: F,
) -> Result<Vec<Task>, AuditError>
where
    G: TextGenerator + ?Sized,
    F: FnMut(&StepReport),
{
    let mut call_failures = 0usize;
    let mut last_error = String::new();
    let result = reduce_with_observer(chunks, tasks, generator, |report: &StepReport| {
        if let StepOutcome::CallFailed(reason) = &report.outcome {
            call_failures += 1;
            last_error = reason.clone();
        }
        observer(report);
    });

    if !chunks.is_empty() && call_failures == chunks.len() {
        return Err(AuditError::LlmUnavailable { chunks: chunks.len(), last_error });
    }
    Ok(result)
}

impl AuditService for Auditor {
    fn audit(&self, request: &AuditRequest) -> Result<Vec<Task>, AuditError> {
        self.run(request)
    }
}
