// SPDX-License-Identifier: MIT

//! Daemon lifecycle management: startup, shutdown, recovery

use std::fs::File;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use docket_adapters::{Adapters, GitRepoAdapter, LlmGenerator, LocalArchive, WalkAnalyzer};
use docket_core::{LeaseQueue, SystemClock, UuidIdGen};
use docket_engine::{Dispatcher, Runner, Worker};
use docket_storage::JobStore;
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};

/// Production adapter set wired from config
#[derive(Clone)]
pub struct DaemonAdapters {
    repos: GitRepoAdapter,
    analyzer: WalkAnalyzer,
    generator: LlmGenerator,
    archive: LocalArchive,
}

impl Adapters for DaemonAdapters {
    type Repos = GitRepoAdapter;
    type Analyzer = WalkAnalyzer;
    type Generator = LlmGenerator;
    type Archive = LocalArchive;

    fn repos(&self) -> &GitRepoAdapter {
        &self.repos
    }
    fn analyzer(&self) -> &WalkAnalyzer {
        &self.analyzer
    }
    fn generator(&self) -> &LlmGenerator {
        &self.generator
    }
    fn archive(&self) -> &LocalArchive {
        &self.archive
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(std::path::PathBuf, std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] docket_storage::StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon state during operation
#[derive(Debug)]
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): held to maintain the exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    pub store: JobStore,
    /// Shared with the workers
    pub queue: Arc<Mutex<LeaseQueue>>,
    pub dispatcher: Dispatcher<UuidIdGen>,
    workers: Vec<JoinHandle<()>>,
    pub clock: SystemClock,
    /// When the daemon started
    pub start_time: Instant,
    /// Shutdown requested flag
    pub shutdown_requested: bool,
}

impl DaemonState {
    /// Shutdown the daemon gracefully
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        for handle in self.workers.drain(..) {
            handle.abort();
        }

        // Snapshot the queue; in-flight claims drop and recovery
        // re-enqueues their jobs on the next start
        {
            let queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = self.store.save_queue(&queue) {
                warn!("Failed to save queue snapshot: {}", e);
            }
        }

        for path in [
            &self.config.socket_path,
            &self.config.lock_path,
            &self.config.version_path,
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!("Failed to remove {}: {}", path.display(), e);
                }
            }
        }

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Acquire the lock file FIRST - prevents startup races
    let lock_file = File::create(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file
    use std::io::Write;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    std::fs::create_dir_all(&config.archive_dir)?;
    std::fs::create_dir_all(&config.workspaces_path)?;
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // Open the store and restore the queue snapshot
    let store = JobStore::open(&config.data_dir)?;
    let mut queue = store
        .load_queue()?
        .unwrap_or_else(|| LeaseQueue::new(config.settings.lease));
    queue.reconfigure(config.settings.lease, config.settings.max_attempts);

    let recovered = recover(&store, &mut queue);
    if recovered > 0 {
        info!(recovered, "re-enqueued non-terminal jobs from previous run");
    }
    store.save_queue(&queue)?;

    info!(
        jobs = store.list().len(),
        queued = queue.len(),
        "loaded state"
    );

    let adapters = DaemonAdapters {
        repos: GitRepoAdapter::new(),
        analyzer: WalkAnalyzer::new(),
        generator: LlmGenerator::new(config.settings.llm.to_llm_config()),
        archive: LocalArchive::new(&config.archive_dir, &config.settings.archive.base_url),
    };

    // Remove stale socket and bind LAST, after all validation passes
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    let queue = Arc::new(Mutex::new(queue));
    let dispatcher = Dispatcher::new(store.clone(), Arc::clone(&queue), UuidIdGen);

    let workers = spawn_workers(config, &store, &queue, &adapters);

    info!(
        workers = workers.len(),
        socket = %config.socket_path.display(),
        "daemon started"
    );

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        store,
        queue,
        dispatcher,
        workers,
        clock: SystemClock,
        start_time: Instant::now(),
        shutdown_requested: false,
    })
}

fn spawn_workers(
    config: &Config,
    store: &JobStore,
    queue: &Arc<Mutex<LeaseQueue>>,
    adapters: &DaemonAdapters,
) -> Vec<JoinHandle<()>> {
    let poll_interval = config.settings.poll_interval;
    (0..config.settings.workers.max(1))
        .map(|n| {
            let runner = Runner::new(
                store.clone(),
                adapters.clone(),
                config.workspaces_path.clone(),
            );
            let worker = Worker::new(
                format!("worker-{n}"),
                store.clone(),
                Arc::clone(queue),
                runner,
            );
            tokio::spawn(async move { worker.run(poll_interval).await })
        })
        .collect()
}

/// Re-enqueue non-terminal jobs that fell out of the queue
///
/// Covers two crash shapes: a job created but never pushed, and a claim
/// that was live when the process died (claims are not persisted).
pub fn recover(store: &JobStore, queue: &mut LeaseQueue) -> usize {
    let mut recovered = 0;
    for job in store.list() {
        if !job.is_terminal() && !queue.contains(&job.id) {
            queue.push(&job.id);
            recovered += 1;
        }
    }
    recovered
}

/// Build a state with no workers, for exercising the server directly
#[cfg(test)]
pub(crate) async fn test_state(dir: &std::path::Path) -> DaemonState {
    let config = Config::for_state_dir(
        dir.join("state"),
        dir.join("sock"),
        crate::config::Settings::default(),
    );
    std::fs::create_dir_all(&config.state_dir).unwrap();
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let lock_file = File::create(&config.lock_path).unwrap();
    let listener = UnixListener::bind(&config.socket_path).unwrap();
    let store = JobStore::open(&config.data_dir).unwrap();
    let queue = Arc::new(Mutex::new(LeaseQueue::new(config.settings.lease)));
    let dispatcher = Dispatcher::new(store.clone(), Arc::clone(&queue), UuidIdGen);
    DaemonState {
        config,
        lock_file,
        listener,
        store,
        queue,
        dispatcher,
        workers: Vec::new(),
        clock: SystemClock,
        start_time: Instant::now(),
        shutdown_requested: false,
    }
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    for path in [
        &config.socket_path,
        &config.version_path,
        &config.lock_path,
    ] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
