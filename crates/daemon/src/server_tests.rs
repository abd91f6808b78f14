// SPDX-License-Identifier: MIT

use super::*;
use crate::lifecycle::test_state;
use docket_core::Stage;

#[tokio::test]
async fn ping_pongs() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_state(dir.path()).await;

    assert_eq!(handle_request(&mut daemon, Request::Ping), Response::Pong);
}

#[tokio::test]
async fn hello_reports_the_protocol_version() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_state(dir.path()).await;

    let response = handle_request(
        &mut daemon,
        Request::Hello {
            version: "0.0.1".to_string(),
        },
    );
    assert_eq!(
        response,
        Response::Hello {
            version: PROTOCOL_VERSION.to_string()
        }
    );
}

#[tokio::test]
async fn submit_returns_the_new_job_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_state(dir.path()).await;

    let response = handle_request(
        &mut daemon,
        Request::Submit {
            reference: "https://github.com/acme/widgets".to_string(),
        },
    );

    let Response::Submitted { id } = response else {
        panic!("expected Submitted, got {:?}", response);
    };
    assert_eq!(daemon.store.get(&id).unwrap().stage, Stage::Queued);
    assert!(daemon.queue.lock().unwrap().contains(&id));
}

#[tokio::test]
async fn submit_rejects_a_bad_reference() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_state(dir.path()).await;

    let response = handle_request(
        &mut daemon,
        Request::Submit {
            reference: "ftp://nope".to_string(),
        },
    );
    assert!(matches!(response, Response::Error { .. }));
    assert!(daemon.store.list().is_empty());
}

#[tokio::test]
async fn job_query_returns_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_state(dir.path()).await;
    let job = daemon
        .dispatcher
        .submit("https://github.com/acme/widgets")
        .unwrap();

    let response = handle_request(
        &mut daemon,
        Request::Query {
            query: Query::Job { id: job.id.clone() },
        },
    );

    let Response::Job { job: got } = response else {
        panic!("expected Job");
    };
    assert_eq!(got.id, job.id);
    assert_eq!(got.stage, Stage::Queued);
}

#[tokio::test]
async fn unknown_job_query_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_state(dir.path()).await;

    let response = handle_request(
        &mut daemon,
        Request::Query {
            query: Query::Job {
                id: "missing".to_string(),
            },
        },
    );
    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn outcome_query_tracks_the_job_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_state(dir.path()).await;
    let job = daemon
        .dispatcher
        .submit("https://github.com/acme/widgets")
        .unwrap();

    let pending = handle_request(
        &mut daemon,
        Request::Query {
            query: Query::Outcome { id: job.id.clone() },
        },
    );
    assert_eq!(
        pending,
        Response::Outcome {
            outcome: JobOutcome::Pending {
                stage: "queued".to_string()
            }
        }
    );

    daemon
        .store
        .update(&job.id, |j| j.advance(Stage::Cloning))
        .unwrap();
    daemon
        .store
        .update(&job.id, |j| j.fail("clone failed: no route"))
        .unwrap();

    let failed = handle_request(
        &mut daemon,
        Request::Query {
            query: Query::Outcome { id: job.id.clone() },
        },
    );
    assert_eq!(
        failed,
        Response::Outcome {
            outcome: JobOutcome::Failed {
                stage: "cloning".to_string(),
                error: "clone failed: no route".to_string(),
            }
        }
    );
}

#[tokio::test]
async fn list_jobs_returns_summaries_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_state(dir.path()).await;
    daemon
        .dispatcher
        .submit("https://github.com/acme/widgets")
        .unwrap();
    daemon
        .dispatcher
        .submit("https://github.com/acme/gadgets")
        .unwrap();

    let response = handle_request(
        &mut daemon,
        Request::Query {
            query: Query::ListJobs,
        },
    );

    let Response::Jobs { jobs } = response else {
        panic!("expected Jobs");
    };
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.stage == "queued" && j.outcome.is_none()));
}

#[tokio::test]
async fn shutdown_sets_the_flag() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_state(dir.path()).await;

    let response = handle_request(&mut daemon, Request::Shutdown);
    assert_eq!(response, Response::ShuttingDown);
    assert!(daemon.shutdown_requested);
}

#[tokio::test]
async fn status_reports_queue_depth_and_active_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_state(dir.path()).await;
    daemon
        .dispatcher
        .submit("https://github.com/acme/widgets")
        .unwrap();

    let response = handle_request(&mut daemon, Request::Status);
    let Response::Status {
        jobs_active,
        queue_depth,
        workers,
        ..
    } = response
    else {
        panic!("expected Status");
    };
    assert_eq!(jobs_active, 1);
    assert_eq!(queue_depth, 1);
    assert_eq!(workers, 2);
}
