// SPDX-License-Identifier: MIT

//! Error types for the engine

use docket_storage::StoreError;
use thiserror::Error;

/// Errors that abort an engine operation
///
/// Stage-collaborator failures are not represented here: the runner
/// records those on the job itself. These variants are the infra-level
/// conditions where the job record could not even be read or written.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("invalid repository reference: {0}")]
    InvalidReference(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
