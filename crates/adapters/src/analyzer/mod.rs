// SPDX-License-Identifier: MIT

//! Codebase analyzer adapter

pub mod fake;
mod walk;

pub use walk::WalkAnalyzer;

use async_trait::async_trait;
use docket_core::RepoAnalysis;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A code file found during analysis
#[derive(Debug, Clone)]
pub struct CodeFile {
    /// Path relative to the checkout root
    pub path: PathBuf,
    pub extension: String,
    pub size: u64,
}

/// Full analysis of a working copy
///
/// `summary` is the client-facing slice that ends up in the job result;
/// the rest feeds the generator.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub summary: RepoAnalysis,
    pub code_files: Vec<CodeFile>,
    pub directories: Vec<String>,
}

/// Errors from the analyzing stage
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("analysis failed: {0}")]
    Failed(String),
}

/// Adapter for the analyzing stage
#[async_trait]
pub trait AnalyzerAdapter: Clone + Send + Sync + 'static {
    async fn analyze(&self, path: &Path) -> Result<Analysis, AnalyzerError>;
}
