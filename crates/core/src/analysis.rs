// SPDX-License-Identifier: MIT

//! Analysis and result payloads carried by job records

use serde::{Deserialize, Serialize};

/// Structured codebase analysis produced by the analyzing stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoAnalysis {
    /// Total files seen, including non-code files
    pub total_files: usize,
    /// Files with a recognized code extension
    pub code_files: usize,
    /// Languages in descending order of file count
    pub languages: Vec<String>,
    /// Detected frameworks, sorted
    pub frameworks: Vec<String>,
}

/// Final artifact of a succeeded job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    /// Externally addressable URL of the generated documentation
    pub doc_url: String,
    /// Repository name derived from the submitted reference
    pub repo_name: String,
    pub analysis: RepoAnalysis,
}
