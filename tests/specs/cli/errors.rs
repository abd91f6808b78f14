//! Argument error specs
//!
//! None of these reach the daemon; clap rejects them first.

use crate::prelude::*;

#[test]
fn unknown_subcommand_fails() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["frobnicate"])
        .fails()
        .stderr_has("unrecognized subcommand");
}

#[test]
fn status_requires_a_job_id() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["status"])
        .fails()
        .stderr_has("required");
}

#[test]
fn submit_requires_a_reference() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["submit"])
        .fails()
        .stderr_has("required");
}
