// SPDX-License-Identifier: MIT

//! JSON file-backed job record store

use docket_core::{IdGen, Job, LeaseQueue, TransitionError, UuidIdGen};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("duplicate job id: {0}")]
    DuplicateId(String),
    #[error("conflicting update: {0}")]
    Conflict(#[from] TransitionError),
}

/// Keyed store for job records
///
/// Readable by many, writable through one mutex. Every mutation is applied
/// as a whole-record replacement and written through to disk before it
/// becomes visible, so snapshots handed to pollers are always consistent.
#[derive(Debug, Clone)]
pub struct JobStore {
    base_path: PathBuf,
    jobs: Arc<Mutex<HashMap<String, Job>>>,
}

impl JobStore {
    /// Open a store at the given path, loading any existing records
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        let jobs_dir = base_path.join("jobs");
        fs::create_dir_all(&jobs_dir)?;

        let mut jobs = HashMap::new();
        for entry in fs::read_dir(&jobs_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let json = fs::read_to_string(&path)?;
                match serde_json::from_str::<Job>(&json) {
                    Ok(job) => {
                        jobs.insert(job.id.clone(), job);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping unreadable job record");
                    }
                }
            }
        }

        Ok(Self {
            base_path,
            jobs: Arc::new(Mutex::new(jobs)),
        })
    }

    /// Open a store in a fresh temp directory (tests)
    pub fn open_temp() -> Result<Self, StoreError> {
        let dir = std::env::temp_dir().join(format!("docket-test-{}", UuidIdGen.next()));
        Self::open(dir)
    }

    /// Create a new job record in the `Queued` stage
    pub fn create(&self, id_gen: &impl IdGen, source: &str) -> Result<Job, StoreError> {
        let id = id_gen.next();
        let mut jobs = self.lock();
        if jobs.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        let job = Job::new(id.clone(), source);
        self.persist(&job)?;
        jobs.insert(id, job.clone());
        Ok(job)
    }

    /// Current snapshot of a record
    pub fn get(&self, id: &str) -> Result<Job, StoreError> {
        self.lock()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Snapshots of all records, newest first
    pub fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.lock().values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    /// Apply a single transition atomically
    ///
    /// The closure receives the current snapshot and returns the
    /// transitioned record; an illegal transition surfaces as
    /// [`StoreError::Conflict`] and leaves the record untouched.
    pub fn update<F>(&self, id: &str, f: F) -> Result<Job, StoreError>
    where
        F: FnOnce(&Job) -> Result<Job, TransitionError>,
    {
        let mut jobs = self.lock();
        let current = jobs
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let next = f(current)?;
        self.persist(&next)?;
        jobs.insert(id.to_string(), next.clone());
        Ok(next)
    }

    /// Load the persisted queue snapshot, if any
    pub fn load_queue(&self) -> Result<Option<LeaseQueue>, StoreError> {
        let path = self.queue_path();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Persist the queue snapshot
    pub fn save_queue(&self, queue: &LeaseQueue) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(queue)?;
        fs::write(self.queue_path(), json)?;
        Ok(())
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    fn persist(&self, job: &Job) -> Result<(), StoreError> {
        let path = self.base_path.join("jobs").join(format!("{}.json", job.id));
        let json = serde_json::to_string_pretty(job)?;
        fs::write(&path, json)?;
        Ok(())
    }

    fn queue_path(&self) -> PathBuf {
        self.base_path.join("queue.json")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Job>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
