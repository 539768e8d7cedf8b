//! Error types for each collaborator boundary.
//!
//! Fetch and token errors are fatal to an audit run. Extraction and model call errors only
//! cost the chunk they occurred on, unless every call of the run fails.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid repository URL: {0}")]
    InvalidRepoUrl(String),

    #[error("Repository {owner}/{repo} is unreachable on branches main and master: {message}")]
    TreeUnavailable { owner: String, repo: String, message: String },

    #[error("Failed building HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("No API key configured for the identity provider")]
    MissingApiKey,

    #[error("Token request failed: {0}")]
    Request(String),

    #[error("Token endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Token response did not contain an access token")]
    MissingToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no bracketed array found")]
    NoArray,

    #[error("malformed JSON: {0}")]
    MalformedJson(String),
}

#[derive(Debug, Error)]
pub enum LlmCallError {
    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Generation endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed decoding generation response: {0}")]
    Decode(String),

    #[error("Generation response contained no results")]
    EmptyResponse,
}

/// Top-level failure of an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Token(#[from] TokenError),

    /// Every model call of the run failed; no chunk was ever seen by the model.
    #[error("Model unavailable: all {chunks} generation calls failed; last error: {last_error}")]
    LlmUnavailable { chunks: usize, last_error: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}
