//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status against an isolated state directory.

use crate::prelude::*;

#[test]
fn daemon_status_reports_not_running() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_stop_when_not_running_is_harmless() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_version() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon running (version");
}

#[test]
fn daemon_start_is_idempotent() {
    let temp = Sandbox::empty();

    temp.docket().args(&["daemon", "start"]).passes();
    temp.docket()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon running");
}

#[test]
fn daemon_status_shows_workers_after_start() {
    let temp = Sandbox::empty();

    temp.docket().args(&["daemon", "start"]).passes();
    temp.docket()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon running")
        .stdout_has("Uptime:")
        .stdout_has("Workers:");
}

#[test]
fn daemon_stop_reports_success() {
    let temp = Sandbox::empty();

    temp.docket().args(&["daemon", "start"]).passes();
    temp.docket()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");
}

#[test]
fn daemon_status_reports_not_running_after_stop() {
    let temp = Sandbox::empty();

    temp.docket().args(&["daemon", "start"]).passes();
    temp.docket().args(&["daemon", "stop"]).passes();
    temp.docket()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_creates_pid_and_version_files() {
    let temp = Sandbox::empty();

    temp.docket().args(&["daemon", "start"]).passes();

    let state = temp.state_path();
    let files_exist = wait_for(SPEC_WAIT_MAX_MS, || {
        state.join("daemon.pid").exists() && state.join("daemon.version").exists()
    });

    assert!(files_exist, "daemon.pid and daemon.version should exist");
}

#[test]
fn daemon_creates_socket_file() {
    let temp = Sandbox::empty();

    temp.docket().args(&["daemon", "start"]).passes();

    let socket = temp.socket_path();
    let has_socket = wait_for(SPEC_WAIT_MAX_MS, || socket.exists());

    assert!(has_socket, "daemon socket file should exist");
}

#[test]
fn daemon_stop_removes_socket_and_pid() {
    let temp = Sandbox::empty();

    temp.docket().args(&["daemon", "start"]).passes();
    temp.docket().args(&["daemon", "stop"]).passes();

    let state = temp.state_path();
    let socket = temp.socket_path();
    let cleaned = wait_for(SPEC_WAIT_MAX_MS, || {
        !socket.exists() && !state.join("daemon.pid").exists()
    });

    assert!(cleaned, "socket and pid file should be removed on stop");
}
