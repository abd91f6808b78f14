// SPDX-License-Identifier: MIT

//! CLI command implementations

pub mod daemon;
pub mod jobs;
pub mod outcome;
pub mod status;
pub mod submit;
