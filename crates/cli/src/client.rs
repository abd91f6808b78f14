// SPDX-License-Identifier: MIT

//! Daemon client for CLI commands

use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use docket_core::Job;
use docket_daemon::protocol::{self, ProtocolError};
use docket_daemon::{JobOutcome, JobSummary, Query, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for IPC requests (hello, status, submit, query, shutdown)
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("DOCKET_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for the daemon to start
pub fn timeout_connect() -> Duration {
    parse_duration_ms("DOCKET_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for a process to exit
pub fn timeout_exit() -> Duration {
    parse_duration_ms("DOCKET_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval for retries
pub fn poll_interval() -> Duration {
    parse_duration_ms("DOCKET_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Daemon rejected request: {0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,
}

/// Daemon client
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to the daemon, auto-starting it if not running
    pub async fn connect_or_start() -> Result<Self, ClientError> {
        // Check the version file first - restart the daemon on a mismatch
        if let Ok(state_dir) = state_dir() {
            let version_path = state_dir.join("daemon.version");
            if let Ok(daemon_version) = std::fs::read_to_string(&version_path) {
                if daemon_version.trim() != env!("CARGO_PKG_VERSION") {
                    let _ = daemon_stop().await;
                }
            }
        }

        match Self::connect() {
            Ok(client) => Ok(client),
            Err(ClientError::DaemonNotRunning) => {
                let child = start_daemon_background()?;
                Self::connect_with_retry(timeout_connect(), child)
            }
            Err(e) => Err(wrap_with_startup_error(e)),
        }
    }

    /// Connect to an existing daemon (no auto-start)
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = socket_path();
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self { socket_path })
    }

    fn connect_with_retry(
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            // A daemon that exited early is a startup failure
            match child.try_wait() {
                Ok(Some(status)) => {
                    // Poll for the startup error in the log (filesystem may need to sync)
                    let poll_start = Instant::now();
                    while poll_start.elapsed() < timeout_exit() {
                        if let Some(err) = read_startup_error() {
                            return Err(ClientError::DaemonStartFailed(err));
                        }
                        std::thread::sleep(poll_interval());
                    }
                    return Err(ClientError::DaemonStartFailed(format!(
                        "exited with {}",
                        status
                    )));
                }
                Ok(None) => {}
                Err(_) => {}
            }

            match Self::connect() {
                Ok(client) => return Ok(client),
                Err(ClientError::DaemonNotRunning) => {
                    std::thread::sleep(poll_interval());
                }
                Err(e) => return Err(wrap_with_startup_error(e)),
            }
        }

        Err(wrap_with_startup_error(ClientError::DaemonStartTimeout))
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(&request)?;
        tokio::time::timeout(timeout_ipc(), protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes =
            tokio::time::timeout(timeout_ipc(), protocol::read_message(&mut reader))
                .await
                .map_err(|_| ProtocolError::Timeout)??;

        Ok(protocol::decode(&response_bytes)?)
    }

    /// Submit a repository reference, returning the new job id
    pub async fn submit(&self, reference: &str) -> Result<String, ClientError> {
        match self
            .send(Request::Submit {
                reference: reference.to_string(),
            })
            .await?
        {
            Response::Submitted { id } => Ok(id),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Fetch a job record
    pub async fn job(&self, id: &str) -> Result<Job, ClientError> {
        match self
            .send(Request::Query {
                query: Query::Job { id: id.to_string() },
            })
            .await?
        {
            Response::Job { job } => Ok(*job),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Poll a job's outcome
    pub async fn outcome(&self, id: &str) -> Result<JobOutcome, ClientError> {
        match self
            .send(Request::Query {
                query: Query::Outcome { id: id.to_string() },
            })
            .await?
        {
            Response::Outcome { outcome } => Ok(outcome),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// List all jobs
    pub async fn jobs(&self) -> Result<Vec<JobSummary>, ClientError> {
        match self
            .send(Request::Query {
                query: Query::ListJobs,
            })
            .await?
        {
            Response::Jobs { jobs } => Ok(jobs),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Get daemon status: uptime, active jobs, queue depth, workers
    pub async fn status(&self) -> Result<(u64, usize, usize, usize), ClientError> {
        match self.send(Request::Status).await? {
            Response::Status {
                uptime_secs,
                jobs_active,
                queue_depth,
                workers,
            } => Ok((uptime_secs, jobs_active, queue_depth, workers)),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Get daemon version via the Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        match self
            .send(Request::Hello {
                version: env!("CARGO_PKG_VERSION").to_string(),
            })
            .await?
        {
            Response::Hello { version } => Ok(version),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

/// Start the daemon in the background, returning the child process handle
fn start_daemon_background() -> Result<std::process::Child, ClientError> {
    let docketd_path = find_docketd_binary();

    Command::new(&docketd_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Stop the daemon (graceful first, then forceful)
/// Returns true if the daemon was stopped, false if it wasn't running
pub async fn daemon_stop() -> Result<bool, ClientError> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => {
            cleanup_stale_pid();
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let shutdown_result = client.shutdown().await;

    if let Some(pid) = read_daemon_pid()? {
        if shutdown_result.is_ok() {
            wait_for_exit(pid, timeout_exit()).await;
        }

        // Force kill if still running
        if process_exists(pid) {
            force_kill_daemon(pid);
            wait_for_exit(pid, timeout_exit()).await;
        }
    }

    cleanup_stale_pid();
    Ok(true)
}

/// Wait for a process to exit
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(poll_interval()).await;
    }
    false
}

/// Find the docketd binary
fn find_docketd_binary() -> PathBuf {
    // Explicit override (used by tests to ensure the correct binary)
    if let Ok(path) = std::env::var("DOCKET_DAEMON_BINARY") {
        return PathBuf::from(path);
    }

    // Check if we're running from cargo (development)
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let dev_path = PathBuf::from(manifest_dir)
            .parent()
            .and_then(|p| p.parent())
            .map(|p| p.join("target/debug/docketd"));
        if let Some(path) = dev_path {
            if path.exists() {
                return path;
            }
        }
    }

    // Check the current executable's directory
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("docketd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    // Fall back to PATH lookup
    PathBuf::from("docketd")
}

/// Socket path shared with the daemon
fn socket_path() -> PathBuf {
    docket_daemon::config::socket_dir().join("docketd.sock")
}

/// State directory shared with the daemon
pub fn state_dir() -> Result<PathBuf, ClientError> {
    docket_daemon::config::default_state_dir().map_err(|_| ClientError::NoStateDir)
}

/// Clean up an orphaned PID file during shutdown.
///
/// Called by daemon_stop when the daemon is not running or after stopping it.
fn cleanup_stale_pid() {
    if let Ok(state_dir) = state_dir() {
        let pid_path = state_dir.join("daemon.pid");
        if pid_path.exists() {
            let _ = std::fs::remove_file(&pid_path);
        }
    }
}

/// Get the PID from the daemon PID file, if it exists
pub fn read_daemon_pid() -> Result<Option<u32>, ClientError> {
    let pid_path = state_dir()?.join("daemon.pid");

    if !pid_path.exists() {
        return Ok(None);
    }

    match std::fs::read_to_string(&pid_path) {
        Ok(content) => Ok(content.trim().parse::<u32>().ok()),
        Err(_) => Ok(None),
    }
}

/// Check if a process with the given PID exists
pub fn process_exists(pid: u32) -> bool {
    // kill -0 checks existence without sending a signal
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Force kill a daemon process
pub fn force_kill_daemon(pid: u32) -> bool {
    Command::new("kill")
        .args(["-9", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Startup marker prefix the daemon writes to the log before anything else.
/// Full format: "--- docketd: starting (pid: 12345) ---"
const STARTUP_MARKER_PREFIX: &str = "--- docketd: starting (pid: ";

/// Read the daemon log from the startup marker, looking for errors.
/// Returns the error message if found, None otherwise.
pub fn read_startup_error() -> Option<String> {
    let log_path = state_dir().ok()?.join("daemon.log");
    let content = std::fs::read_to_string(&log_path).ok()?;

    // Find the last startup marker
    let start_pos = content.rfind(STARTUP_MARKER_PREFIX)?;
    let startup_log = &content[start_pos..];

    let errors: Vec<&str> = startup_log
        .lines()
        .filter(|line| line.contains(" ERROR ") || line.contains("Failed to start"))
        .collect();

    if errors.is_empty() {
        return None;
    }

    // Extract just the error messages (strip timestamp/level prefix)
    let error_messages: Vec<String> = errors
        .iter()
        .filter_map(|line| line.split_once(": ").map(|(_, msg)| msg.to_string()))
        .collect();

    if error_messages.is_empty() {
        Some(errors.join("\n"))
    } else {
        Some(error_messages.join("\n"))
    }
}

/// Wrap an error with startup log info if available.
fn wrap_with_startup_error(err: ClientError) -> ClientError {
    // Don't double-wrap
    if matches!(err, ClientError::DaemonStartFailed(_)) {
        return err;
    }

    if let Some(startup_error) = read_startup_error() {
        ClientError::DaemonStartFailed(startup_error)
    } else {
        err
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
