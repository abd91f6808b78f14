//! Help and version specs

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["--help"])
        .passes()
        .stdout_has("submit")
        .stdout_has("status")
        .stdout_has("jobs")
        .stdout_has("daemon");
}

#[test]
fn version_prints_name_and_number() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["--version"])
        .passes()
        .stdout_has("docket");
}

#[test]
fn submit_help_shows_wait_flag() {
    let temp = Sandbox::empty();

    temp.docket()
        .args(&["submit", "--help"])
        .passes()
        .stdout_has("--wait");
}
