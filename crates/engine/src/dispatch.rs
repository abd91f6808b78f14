// SPDX-License-Identifier: MIT

//! Submission intake and lease sweeping

use crate::EngineError;
use docket_adapters::validate_reference;
use docket_core::{Clock, IdGen, Job, LeaseQueue, TickReport};
use docket_storage::{JobStore, StoreError};
use std::sync::{Arc, Mutex};

/// Turns submissions into queued job records and sweeps expired leases
///
/// The queue mutex is shared with the workers; every mutation is followed
/// by a snapshot save so a restart resumes from the last persisted shape.
#[derive(Debug)]
pub struct Dispatcher<I> {
    store: JobStore,
    queue: Arc<Mutex<LeaseQueue>>,
    id_gen: I,
}

impl<I: IdGen> Dispatcher<I> {
    pub fn new(store: JobStore, queue: Arc<Mutex<LeaseQueue>>, id_gen: I) -> Self {
        Self {
            store,
            queue,
            id_gen,
        }
    }

    /// Accept a repository reference: create the record, enqueue its id
    ///
    /// The reference is validated before anything is persisted; a rejected
    /// submission leaves no trace in the store.
    pub fn submit(&self, reference: &str) -> Result<Job, EngineError> {
        if !validate_reference(reference) {
            return Err(EngineError::InvalidReference(reference.to_string()));
        }

        let job = self.store.create(&self.id_gen, reference)?;
        {
            let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
            queue.push(&job.id);
            self.store.save_queue(&queue)?;
        }

        tracing::info!(job_id = %job.id, reference, "job submitted");
        Ok(job)
    }

    /// Sweep expired leases and reconcile job records with the result
    ///
    /// Requeued ids get their record's attempt counter bumped to match the
    /// queue's; dead-lettered ids freeze their job as failed. A record that
    /// is already terminal or missing is left alone.
    pub fn tick(&self, clock: &impl Clock) -> Result<TickReport, EngineError> {
        let report = {
            let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
            let report = queue.tick(clock);
            if !report.requeued.is_empty() || !report.dead.is_empty() {
                self.store.save_queue(&queue)?;
            }
            report
        };

        for job_id in &report.requeued {
            tracing::warn!(job_id, "lease expired, job requeued");
            match self.store.update(job_id, |j| Ok(j.with_incremented_attempts())) {
                Ok(_) | Err(StoreError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        for job_id in &report.dead {
            tracing::error!(job_id, "delivery attempts exhausted, freezing job");
            match self
                .store
                .update(job_id, |j| j.fail("delivery attempts exhausted"))
            {
                Ok(_) | Err(StoreError::NotFound(_)) | Err(StoreError::Conflict(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
