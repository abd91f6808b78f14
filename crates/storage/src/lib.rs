// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! docket-storage: concurrency-safe job record store
//!
//! One JSON file per job record, plus a queue snapshot. All reads return
//! whole-record clones; all writes go through a single mutex so a poller
//! never observes a half-applied transition.

mod store;

pub use store::{JobStore, StoreError};
