//! repo-audit: audit a GitHub repository against a checklist of implementation tasks
//!
//! The repository is fetched, packed into size-bounded text chunks, and folded through a
//! language model one chunk at a time. Each chunk sees the task list as the previous chunk
//! left it.

pub mod audit;
pub mod chunk;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod llm;
pub mod server;
pub mod utils;
