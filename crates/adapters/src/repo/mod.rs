// SPDX-License-Identifier: MIT

//! Source repository adapter: reference validation and cloning

pub mod fake;
mod git;

pub use git::GitRepoAdapter;

use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// A cloned working copy
#[derive(Debug, Clone)]
pub struct Checkout {
    pub path: PathBuf,
    pub repo_name: String,
}

/// Errors from repository operations
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("invalid repository reference: {0}")]
    InvalidReference(String),
    #[error("clone failed: {0}")]
    CloneFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter for the cloning stage
#[async_trait]
pub trait RepoAdapter: Clone + Send + Sync + 'static {
    /// Clone the referenced repository into `dest`
    async fn clone_repo(&self, reference: &str, dest: &Path) -> Result<Checkout, RepoError>;

    /// Remove a working copy; safe to call on an already-removed path
    async fn cleanup(&self, checkout: &Checkout) -> Result<(), RepoError>;
}

// Patterns are compile-time constants; a failure to parse is a defect.
#[allow(clippy::unwrap_used)]
fn reference_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // https://github.com/owner/repo (optional trailing slash)
            Regex::new(r"^https://github\.com/[\w-]+/[\w.-]+/?$").unwrap(),
            // git@github.com:owner/repo.git
            Regex::new(r"^git@github\.com:[\w-]+/[\w.-]+\.git$").unwrap(),
            // generic https git remote
            Regex::new(r"^https?://[\w.-]+/[\w./-]+\.git$").unwrap(),
        ]
    })
}

/// Whether a submitted reference looks like a cloneable repository URL
///
/// Runs at the submission boundary, before any job record exists.
pub fn validate_reference(reference: &str) -> bool {
    let reference = reference.trim();
    !reference.is_empty() && reference_patterns().iter().any(|p| p.is_match(reference))
}

/// Derive a filesystem-safe repository name from a reference
///
/// `https://github.com/acme/widgets.git` becomes `acme_widgets`.
pub fn repo_name(reference: &str) -> String {
    let trimmed = reference
        .trim()
        .trim_end_matches('/')
        .trim_end_matches(".git");
    let tail = trimmed
        .rsplit_once(['/', ':'])
        .map(|(head, repo)| {
            let owner = head.rsplit(['/', ':']).next().unwrap_or("");
            if owner.is_empty() || owner.contains('.') {
                repo.to_string()
            } else {
                format!("{}_{}", owner, repo)
            }
        })
        .unwrap_or_else(|| trimmed.to_string());
    tail.replace(['/', ':'], "_")
}
