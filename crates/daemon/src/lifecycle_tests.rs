// SPDX-License-Identifier: MIT

use super::*;
use crate::config::Settings;
use docket_core::{SequentialIdGen, Stage};
use std::time::Duration;

fn test_config(dir: &std::path::Path) -> Config {
    Config::for_state_dir(
        dir.join("state"),
        dir.join("sock"),
        Settings {
            workers: 1,
            poll_interval: Duration::from_millis(10),
            ..Settings::default()
        },
    )
}

#[test]
fn recover_re_enqueues_non_terminal_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let store = JobStore::open(dir.path()).unwrap();
    let ids = SequentialIdGen::new("job");

    // stuck in queued, mid-pipeline, and finished
    let stuck = store.create(&ids, "https://github.com/acme/one").unwrap();
    let running = store.create(&ids, "https://github.com/acme/two").unwrap();
    store
        .update(&running.id, |j| j.advance(Stage::Cloning))
        .unwrap();
    let done = store.create(&ids, "https://github.com/acme/three").unwrap();
    store.update(&done.id, |j| j.fail("gone")).unwrap();

    let mut queue = LeaseQueue::new(Duration::from_secs(60));
    let recovered = recover(&store, &mut queue);

    assert_eq!(recovered, 2);
    assert!(queue.contains(&stuck.id));
    assert!(queue.contains(&running.id));
    assert!(!queue.contains(&done.id));
}

#[test]
fn recover_leaves_already_queued_jobs_alone() {
    let dir = tempfile::tempdir().unwrap();
    let store = JobStore::open(dir.path()).unwrap();
    let ids = SequentialIdGen::new("job");

    let job = store.create(&ids, "https://github.com/acme/one").unwrap();
    let mut queue = LeaseQueue::new(Duration::from_secs(60));
    queue.push(&job.id);

    assert_eq!(recover(&store, &mut queue), 0);
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn startup_acquires_lock_and_binds_socket() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut daemon = startup(&config).await.unwrap();

    assert!(config.socket_path.exists());
    assert!(config.lock_path.exists());
    assert_eq!(
        std::fs::read_to_string(&config.version_path).unwrap(),
        env!("CARGO_PKG_VERSION")
    );

    daemon.shutdown().await.unwrap();
    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
}

#[tokio::test]
async fn second_startup_fails_while_lock_is_held() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut daemon = startup(&config).await.unwrap();

    let second = Config::for_state_dir(
        dir.path().join("state"),
        dir.path().join("sock2"),
        Settings::default(),
    );
    let err = startup(&second).await.unwrap_err();
    assert!(matches!(err, LifecycleError::LockFailed(_)));

    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn startup_processes_jobs_left_from_a_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    // a record persisted by a previous process that died before queueing it
    let store = JobStore::open(&config.data_dir).unwrap();
    let job = store
        .create(&SequentialIdGen::new("job"), "https://github.com/acme/one")
        .unwrap();

    let mut daemon = startup(&config).await.unwrap();
    assert!(daemon
        .queue
        .lock()
        .unwrap()
        .contains(&job.id));

    daemon.shutdown().await.unwrap();
}
