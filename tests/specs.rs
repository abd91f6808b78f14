//! Behavioral specifications for the docket CLI.
//!
//! These tests are black-box: they invoke the CLI binary and verify
//! stdout, stderr, and exit codes. Each test runs against an isolated
//! state directory so daemons never leak between tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// daemon/
#[path = "specs/daemon/lifecycle.rs"]
mod daemon_lifecycle;

// jobs/
#[path = "specs/jobs/listing.rs"]
mod jobs_listing;
#[path = "specs/jobs/submit.rs"]
mod jobs_submit;
