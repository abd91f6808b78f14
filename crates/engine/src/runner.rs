// SPDX-License-Identifier: MIT

//! Pipeline runner: walks one job through its stage collaborators
//!
//! Delivery is at-least-once, so a job may arrive here more than once.
//! Collaborators re-run from the top on redelivery (their outputs are
//! keyed by job id and overwrite cleanly), but recorded stages only move
//! forward: an advance below the stage already on the record is skipped
//! rather than persisted.

use crate::EngineError;
use docket_adapters::{
    Adapters, AnalyzerAdapter, ArchiveAdapter, Checkout, DocSet, GeneratorAdapter, RepoAdapter,
};
use docket_core::{Job, JobResult, Stage};
use docket_storage::{JobStore, StoreError};
use std::path::{Path, PathBuf};

/// A failure local to one run attempt
enum RunError {
    /// A stage collaborator failed: freeze the job with this message
    Stage(String),
    /// The store itself failed: abort and leave the claim to expire
    Infra(EngineError),
}

impl From<StoreError> for RunError {
    fn from(e: StoreError) -> Self {
        RunError::Infra(e.into())
    }
}

/// Executes the clone, analyze, generate, upload sequence for one job
pub struct Runner<A> {
    store: JobStore,
    adapters: A,
    workspaces_dir: PathBuf,
}

impl<A: Adapters> Runner<A> {
    pub fn new(store: JobStore, adapters: A, workspaces_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            adapters,
            workspaces_dir: workspaces_dir.into(),
        }
    }

    /// Run a claimed job to a terminal state
    ///
    /// Returns the final job record. A job that is already terminal is
    /// returned untouched: the claim was a redelivery of finished work and
    /// the caller just acknowledges it. Collaborator failures freeze the
    /// job as failed and are not errors here; only store failures are.
    pub async fn run(&self, job_id: &str) -> Result<Job, EngineError> {
        let job = self.store.get(job_id)?;
        if job.is_terminal() {
            tracing::debug!(job_id, stage = %job.stage, "job already terminal");
            return Ok(job);
        }

        tracing::info!(job_id, source = %job.source, attempt = job.attempts, "running job");

        let scratch = self.workspaces_dir.join(job_id);
        let outcome = self.run_stages(&job, &scratch).await;

        if let Err(e) = std::fs::remove_dir_all(&scratch) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(job_id, error = %e, "failed to remove scratch dir");
            }
        }

        match outcome {
            Ok(job) => {
                tracing::info!(job_id, "job succeeded");
                Ok(job)
            }
            Err(RunError::Stage(message)) => {
                tracing::warn!(job_id, error = %message, "job failed");
                Ok(self.store.update(job_id, |j| j.fail(&message))?)
            }
            Err(RunError::Infra(e)) => Err(e),
        }
    }

    async fn run_stages(&self, job: &Job, scratch: &Path) -> Result<Job, RunError> {
        self.ensure_stage(&job.id, Stage::Cloning)?;
        let checkout = self
            .adapters
            .repos()
            .clone_repo(&job.source, &scratch.join("repo"))
            .await
            .map_err(|e| RunError::Stage(format!("cloning failed: {e}")))?;

        let result = self.run_checked_out(job, scratch, &checkout).await;

        if let Err(e) = self.adapters.repos().cleanup(&checkout).await {
            tracing::warn!(job_id = %job.id, error = %e, "checkout cleanup failed");
        }

        result
    }

    async fn run_checked_out(
        &self,
        job: &Job,
        scratch: &Path,
        checkout: &Checkout,
    ) -> Result<Job, RunError> {
        self.ensure_stage(&job.id, Stage::Analyzing)?;
        let analysis = self
            .adapters
            .analyzer()
            .analyze(&checkout.path)
            .await
            .map_err(|e| RunError::Stage(format!("analyzing failed: {e}")))?;

        self.ensure_stage(&job.id, Stage::Generating)?;
        let docs = self
            .adapters
            .generator()
            .generate(checkout, &analysis)
            .await
            .map_err(|e| RunError::Stage(format!("generating failed: {e}")))?;
        let docs_dir = write_docs(&scratch.join("docs"), &docs)
            .map_err(|e| RunError::Stage(format!("generating failed: {e}")))?;

        self.ensure_stage(&job.id, Stage::Uploading)?;
        let doc_url = self
            .adapters
            .archive()
            .store(&job.id, &docs_dir)
            .await
            .map_err(|e| RunError::Stage(format!("uploading failed: {e}")))?;

        let result = JobResult {
            doc_url,
            repo_name: checkout.repo_name.clone(),
            analysis: analysis.summary.clone(),
        };
        if let Err(e) = self.adapters.archive().write_metadata(&job.id, &result).await {
            return Err(RunError::Stage(format!("uploading failed: {e}")));
        }

        Ok(self.store.update(&job.id, |j| j.succeed(result))?)
    }

    /// Persist an advance to `target` unless the record is already there
    ///
    /// Skipping the write keeps observed stages monotonic across
    /// redeliveries while still letting the collaborators re-run.
    fn ensure_stage(&self, job_id: &str, target: Stage) -> Result<Job, RunError> {
        let job = self.store.get(job_id)?;
        if job.stage >= target {
            return Ok(job);
        }
        Ok(self.store.update(job_id, |j| j.advance(target))?)
    }
}

/// Materialize a doc set as a file tree rooted at `dir`
///
/// Layout: README.md and SETUP.md at the root, one README.md per
/// documented folder, and per-file docs under detailed_docs/ with path
/// separators and dots flattened to underscores.
fn write_docs(dir: &Path, docs: &DocSet) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join("README.md"), &docs.main_readme)?;
    std::fs::write(dir.join("SETUP.md"), &docs.setup_guide)?;

    for (folder, content) in &docs.folder_readmes {
        if folder.starts_with('/') || folder.split('/').any(|part| part == "..") {
            tracing::warn!(folder, "skipping folder readme outside docs root");
            continue;
        }
        let folder_dir = dir.join(folder);
        std::fs::create_dir_all(&folder_dir)?;
        std::fs::write(folder_dir.join("README.md"), content)?;
    }

    if !docs.detailed_docs.is_empty() {
        let detail_dir = dir.join("detailed_docs");
        std::fs::create_dir_all(&detail_dir)?;
        for (path, content) in &docs.detailed_docs {
            std::fs::write(detail_dir.join(doc_file_name(path)), content)?;
        }
    }

    Ok(dir.to_path_buf())
}

fn doc_file_name(path: &str) -> String {
    let mut name: String = path
        .chars()
        .map(|c| if c == '/' || c == '.' { '_' } else { c })
        .collect();
    name.push_str(".md");
    name
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
