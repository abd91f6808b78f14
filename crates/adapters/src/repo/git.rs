// SPDX-License-Identifier: MIT

//! Git-based repository adapter

use super::{repo_name, validate_reference, Checkout, RepoAdapter, RepoError};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Clones repositories by shelling out to `git`
#[derive(Clone, Default)]
pub struct GitRepoAdapter;

impl GitRepoAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RepoAdapter for GitRepoAdapter {
    async fn clone_repo(&self, reference: &str, dest: &Path) -> Result<Checkout, RepoError> {
        if !validate_reference(reference) {
            return Err(RepoError::InvalidReference(reference.to_string()));
        }

        tracing::debug!(reference, dest = %dest.display(), "cloning repository");

        prepare_dest(dest).await?;

        let output = Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(reference)
            .arg(dest)
            .output()
            .await
            .map_err(|e| RepoError::CloneFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Remove any partial clone before reporting
            if dest.exists() {
                let _ = tokio::fs::remove_dir_all(dest).await;
            }
            return Err(RepoError::CloneFailed(stderr.trim().to_string()));
        }

        Ok(Checkout {
            path: dest.to_path_buf(),
            repo_name: repo_name(reference),
        })
    }

    async fn cleanup(&self, checkout: &Checkout) -> Result<(), RepoError> {
        if checkout.path.exists() {
            tokio::fs::remove_dir_all(&checkout.path).await?;
        }
        Ok(())
    }
}

/// Clear a leftover checkout from an interrupted run
///
/// git refuses to clone into a non-empty directory, so a redelivered job
/// replaces the previous attempt's tree, the same way the archive replaces
/// a repeated upload.
async fn prepare_dest(dest: &Path) -> Result<(), RepoError> {
    if dest.exists() {
        tokio::fs::remove_dir_all(dest).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn leftover_checkout_is_removed_before_cloning() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("repo");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("stale.py"), "pass\n").unwrap();

        prepare_dest(&dest).await.unwrap();
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn missing_dest_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        prepare_dest(&dir.path().join("repo")).await.unwrap();
    }
}
