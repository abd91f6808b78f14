// SPDX-License-Identifier: MIT

//! Fake archive for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ArchiveAdapter, ArchiveError};
use async_trait::async_trait;
use docket_core::JobResult;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Fake archive recording stored job ids
#[derive(Clone, Default)]
pub struct FakeArchive {
    stored: Arc<Mutex<Vec<String>>>,
    metadata: Arc<Mutex<Vec<JobResult>>>,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl FakeArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    /// Job ids stored so far, in order (repeats included)
    pub fn stored(&self) -> Vec<String> {
        self.stored.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn metadata(&self) -> Vec<JobResult> {
        self.metadata.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ArchiveAdapter for FakeArchive {
    async fn store(&self, job_id: &str, _docs_dir: &Path) -> Result<String, ArchiveError> {
        if let Some(message) = self
            .fail_with
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(ArchiveError::Failed(message));
        }
        self.stored
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(job_id.to_string());
        Ok(format!("fake://docs/{}/README.md", job_id))
    }

    async fn write_metadata(&self, _job_id: &str, result: &JobResult) -> Result<(), ArchiveError> {
        self.metadata
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(result.clone());
        Ok(())
    }
}
