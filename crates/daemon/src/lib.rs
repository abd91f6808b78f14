// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! docket-daemon: background process that owns the queue and the workers
//!
//! The library half exposes the wire protocol and the path/config
//! resolution the CLI shares; the `docketd` binary wires them to the
//! socket server and the worker pool.

pub mod config;
pub mod lifecycle;
pub mod protocol;
pub mod server;

pub use config::{Config, Settings};
pub use protocol::{JobOutcome, JobSummary, Query, Request, Response};
