// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! docket-core: Domain types for the Docket documentation pipeline
//!
//! This crate provides:
//! - The job record and its stage state machine
//! - A lease queue with visibility-timeout semantics
//! - Clock and ID-generation abstractions for testable time and identity
//! - Analysis and result payload types shared across crates
//!
//! Everything here is pure: no filesystem, no sockets, no processes.

pub mod analysis;
pub mod clock;
pub mod id;
pub mod job;
pub mod queue;

pub use analysis::{JobResult, RepoAnalysis};
pub use clock::{Clock, FakeClock, SystemClock};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use job::{Job, Outcome, Stage, TransitionError};
pub use queue::{ClaimedJob, DeadLetter, LeaseQueue, TickReport};
