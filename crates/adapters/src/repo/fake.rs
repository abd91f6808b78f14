// SPDX-License-Identifier: MIT

//! Fake repository adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{repo_name, Checkout, RepoAdapter, RepoError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Recorded repo call
#[derive(Debug, Clone)]
pub enum RepoCall {
    Clone { reference: String, dest: PathBuf },
    Cleanup { path: PathBuf },
}

/// Fake repository adapter: materializes a tiny working copy on disk
#[derive(Clone, Default)]
pub struct FakeRepoAdapter {
    calls: Arc<Mutex<Vec<RepoCall>>>,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl FakeRepoAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent clone fail with the given message
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    /// Clear a scripted failure
    pub fn succeed(&self) {
        *self.fail_with.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl RepoAdapter for FakeRepoAdapter {
    async fn clone_repo(&self, reference: &str, dest: &Path) -> Result<Checkout, RepoError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RepoCall::Clone {
                reference: reference.to_string(),
                dest: dest.to_path_buf(),
            });

        if let Some(message) = self
            .fail_with
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(RepoError::CloneFailed(message));
        }

        // Same contract as the real adapter: a leftover tree is replaced
        if dest.exists() {
            std::fs::remove_dir_all(dest)?;
        }
        std::fs::create_dir_all(dest)?;
        std::fs::write(dest.join("main.py"), "def main():\n    pass\n")?;
        std::fs::write(dest.join("README.md"), "# fixture\n")?;

        Ok(Checkout {
            path: dest.to_path_buf(),
            repo_name: repo_name(reference),
        })
    }

    async fn cleanup(&self, checkout: &Checkout) -> Result<(), RepoError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RepoCall::Cleanup {
                path: checkout.path.clone(),
            });
        if checkout.path.exists() {
            std::fs::remove_dir_all(&checkout.path)?;
        }
        Ok(())
    }
}
