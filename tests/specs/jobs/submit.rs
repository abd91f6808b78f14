//! Submission specs
//!
//! Submitted references use a placeholder GitHub URL; the pipeline may
//! fail at the clone stage, but the record and its status survive.

use crate::prelude::*;

const PLACEHOLDER_REPO: &str = "https://github.com/docket-specs/placeholder";

fn submitted_id(temp: &Sandbox) -> String {
    let out = temp
        .docket()
        .args(&["submit", PLACEHOLDER_REPO])
        .passes()
        .stdout_has("Submitted:")
        .stdout();
    out.lines()
        .find_map(|line| line.strip_prefix("Submitted: "))
        .map(str::to_string)
        .unwrap()
}

#[test]
fn submit_rejects_invalid_reference() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["submit", "ftp://nope"])
        .fails()
        .stderr_has("invalid repository reference");
}

#[test]
fn submit_prints_id_and_poll_hint() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["submit", PLACEHOLDER_REPO])
        .passes()
        .stdout_has("Submitted:")
        .stdout_has("Poll with: docket status");
}

#[test]
fn status_shows_submitted_job() {
    let temp = Sandbox::empty();
    let id = submitted_id(&temp);

    temp.docket()
        .args(&["status", &id])
        .passes()
        .stdout_has(&format!("Job:      {id}"))
        .stdout_has(PLACEHOLDER_REPO);
}

#[test]
fn status_of_unknown_job_fails() {
    let temp = Sandbox::empty();
    temp.docket().args(&["daemon", "start"]).passes();

    temp.docket()
        .args(&["status", "no-such-job"])
        .fails()
        .stderr_has("job not found");
}

#[test]
fn each_submission_gets_a_distinct_id() {
    let temp = Sandbox::empty();

    let first = submitted_id(&temp);
    let second = submitted_id(&temp);

    assert_ne!(first, second);
}
