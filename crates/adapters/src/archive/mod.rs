// SPDX-License-Identifier: MIT

//! Artifact archive adapter: durable storage for generated documentation

pub mod fake;
mod local;

pub use local::LocalArchive;

use async_trait::async_trait;
use docket_core::JobResult;
use std::path::Path;
use thiserror::Error;

/// Errors from the uploading stage
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("storage failed: {0}")]
    Failed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Adapter for the uploading stage
///
/// The job id is the output key: storing the same job twice replaces the
/// previous artifact set, so at-least-once delivery repeats are harmless.
#[async_trait]
pub trait ArchiveAdapter: Clone + Send + Sync + 'static {
    /// Store the documentation tree, returning its addressable URL
    async fn store(&self, job_id: &str, docs_dir: &Path) -> Result<String, ArchiveError>;

    /// Store job metadata alongside the artifact
    async fn write_metadata(&self, job_id: &str, result: &JobResult) -> Result<(), ArchiveError>;
}
