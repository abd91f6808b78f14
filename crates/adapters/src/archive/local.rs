// SPDX-License-Identifier: MIT

//! Local filesystem archive

use super::{ArchiveAdapter, ArchiveError};
use async_trait::async_trait;
use docket_core::JobResult;
use std::path::{Path, PathBuf};

/// Stores documentation trees under `<base_dir>/<job_id>`
#[derive(Clone)]
pub struct LocalArchive {
    base_dir: PathBuf,
    base_url: String,
}

impl LocalArchive {
    pub fn new(base_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            base_url: base_url.into(),
        }
    }

    /// Path of a stored artifact set
    pub fn job_dir(&self, job_id: &str) -> PathBuf {
        self.base_dir.join(job_id)
    }

    fn copy_tree(src: &Path, dest: &Path) -> Result<(), ArchiveError> {
        std::fs::create_dir_all(dest)?;
        for entry in std::fs::read_dir(src)? {
            let entry = entry?;
            let target = dest.join(entry.file_name());
            if entry.path().is_dir() {
                Self::copy_tree(&entry.path(), &target)?;
            } else {
                std::fs::copy(entry.path(), target)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ArchiveAdapter for LocalArchive {
    async fn store(&self, job_id: &str, docs_dir: &Path) -> Result<String, ArchiveError> {
        let job_dir = self.job_dir(job_id);

        // Stable output key: a repeat replaces the previous artifact set
        if job_dir.exists() {
            std::fs::remove_dir_all(&job_dir)?;
        }
        Self::copy_tree(docs_dir, &job_dir)?;

        tracing::debug!(job_id, dir = %job_dir.display(), "stored documentation");
        Ok(format!("{}/docs/{}/README.md", self.base_url, job_id))
    }

    async fn write_metadata(&self, job_id: &str, result: &JobResult) -> Result<(), ArchiveError> {
        let job_dir = self.job_dir(job_id);
        std::fs::create_dir_all(&job_dir)?;
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(job_dir.join("metadata.json"), json)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
