//! Job listing specs

use crate::prelude::*;

const PLACEHOLDER_REPO: &str = "https://github.com/docket-specs/placeholder";

#[test]
fn jobs_reports_empty_table() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["jobs"])
        .passes()
        .stdout_has("No jobs found.");
}

#[test]
fn jobs_lists_submitted_job() {
    let temp = Sandbox::empty();

    let out = temp
        .docket()
        .args(&["submit", PLACEHOLDER_REPO])
        .passes()
        .stdout();
    let id = out
        .lines()
        .find_map(|line| line.strip_prefix("Submitted: "))
        .unwrap()
        .to_string();

    temp.docket()
        .args(&["jobs"])
        .passes()
        .stdout_has("ID")
        .stdout_has(&id)
        .stdout_has(PLACEHOLDER_REPO);
}
