// SPDX-License-Identifier: MIT

//! Fake analyzer for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Analysis, AnalyzerAdapter, AnalyzerError, CodeFile};
use async_trait::async_trait;
use docket_core::RepoAnalysis;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Fake analyzer returning a canned analysis
#[derive(Clone, Default)]
pub struct FakeAnalyzer {
    fail_with: Arc<Mutex<Option<String>>>,
}

impl FakeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }
}

#[async_trait]
impl AnalyzerAdapter for FakeAnalyzer {
    async fn analyze(&self, _path: &Path) -> Result<Analysis, AnalyzerError> {
        if let Some(message) = self
            .fail_with
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(AnalyzerError::Failed(message));
        }

        Ok(Analysis {
            summary: RepoAnalysis {
                total_files: 2,
                code_files: 1,
                languages: vec!["Python".to_string()],
                frameworks: vec![],
            },
            code_files: vec![CodeFile {
                path: "main.py".into(),
                extension: "py".to_string(),
                size: 24,
            }],
            directories: vec![],
        })
    }
}
