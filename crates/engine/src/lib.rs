// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! docket-engine: dispatcher, pipeline runner, and worker loop
//!
//! The dispatcher turns submissions into queued job records; workers claim
//! ids from the shared lease queue and hand them to the runner, which walks
//! a job through the stage collaborators and freezes it with an outcome.

mod dispatch;
mod error;
mod runner;
mod worker;

pub use dispatch::Dispatcher;
pub use error::EngineError;
pub use runner::Runner;
pub use worker::Worker;
