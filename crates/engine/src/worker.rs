// SPDX-License-Identifier: MIT

//! Worker loop: claim, run, acknowledge

use crate::{EngineError, Runner};
use docket_adapters::Adapters;
use docket_core::{LeaseQueue, SystemClock};
use docket_storage::JobStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One polling worker over the shared lease queue
///
/// Each claim gets a fresh claim id so a worker that dies mid-run cannot
/// be confused with its own next claim. A run that ends in a terminal
/// record acknowledges the claim; a store failure leaves the claim in
/// place for the lease sweep to requeue.
pub struct Worker<A> {
    id: String,
    store: JobStore,
    queue: Arc<Mutex<LeaseQueue>>,
    runner: Runner<A>,
    clock: SystemClock,
}

impl<A: Adapters> Worker<A> {
    pub fn new(
        id: impl Into<String>,
        store: JobStore,
        queue: Arc<Mutex<LeaseQueue>>,
        runner: Runner<A>,
    ) -> Self {
        Self {
            id: id.into(),
            store,
            queue,
            runner,
            clock: SystemClock,
        }
    }

    /// Claim and run at most one job
    ///
    /// Returns `Ok(true)` if a job was claimed, `Ok(false)` if the queue
    /// was empty.
    pub async fn run_once(&self) -> Result<bool, EngineError> {
        let claim_id = format!("{}-{}", self.id, uuid::Uuid::new_v4());

        let claimed = {
            let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
            match queue.claim(&claim_id, &self.clock) {
                Some(job_id) => {
                    self.store.save_queue(&queue)?;
                    Some(job_id)
                }
                None => None,
            }
        };

        let Some(job_id) = claimed else {
            return Ok(false);
        };

        tracing::debug!(worker = %self.id, job_id = %job_id, "claimed job");

        match self.runner.run(&job_id).await {
            Ok(job) => {
                let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
                queue.complete(&claim_id);
                self.store.save_queue(&queue)?;
                tracing::info!(
                    worker = %self.id,
                    job_id = %job_id,
                    stage = %job.stage,
                    "job finished"
                );
                Ok(true)
            }
            Err(e) => {
                tracing::error!(worker = %self.id, job_id = %job_id, error = %e, "run aborted");
                Err(e)
            }
        }
    }

    /// Poll until the owning task is aborted
    pub async fn run(&self, poll_interval: Duration) {
        loop {
            match self.run_once().await {
                Ok(true) => {}
                Ok(false) => tokio::time::sleep(poll_interval).await,
                Err(e) => {
                    tracing::error!(worker = %self.id, error = %e, "worker iteration failed");
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
