// SPDX-License-Identifier: MIT

//! Job record and stage state machine
//!
//! A job moves forward through a fixed stage order and never regresses.
//! Failure is not a stage: a failed job keeps the stage it reached and is
//! frozen with `Outcome::Failed` plus a descriptive error. Success enters
//! the `Succeeded` stage and freezes the record with its result in the
//! same step.

use crate::analysis::JobResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Position in the fixed pipeline ordering
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Queued,
    Cloning,
    Analyzing,
    Generating,
    Uploading,
    Succeeded,
}

impl Stage {
    /// The successor on the success path, `None` from the terminal stage
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Queued => Some(Stage::Cloning),
            Stage::Cloning => Some(Stage::Analyzing),
            Stage::Analyzing => Some(Stage::Generating),
            Stage::Generating => Some(Stage::Uploading),
            Stage::Uploading => Some(Stage::Succeeded),
            Stage::Succeeded => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Queued => "queued",
            Stage::Cloning => "cloning",
            Stage::Analyzing => "analyzing",
            Stage::Generating => "generating",
            Stage::Uploading => "uploading",
            Stage::Succeeded => "succeeded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a job left the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// Illegal transition attempts
///
/// These are programming errors or stale-writer races, not recoverable
/// runtime conditions; callers abort the attempt rather than retry.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("illegal stage transition: {from} -> {to}")]
    Illegal { from: Stage, to: Stage },
    #[error("job {id} is frozen in stage {stage}")]
    Frozen { id: String, stage: Stage },
}

/// One submitted documentation request and its tracked progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    /// Repository reference supplied at submission, immutable
    pub source: String,
    pub stage: Stage,
    /// `None` while the job is in flight
    pub outcome: Option<Outcome>,
    /// Present only when `outcome` is `Succeeded`
    pub result: Option<JobResult>,
    /// Present only when `outcome` is `Failed`
    pub error: Option<String>,
    /// Delivery attempts, bumped by the queue on re-dispatch
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job in the `Queued` stage
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            source: source.into(),
            stage: Stage::Queued,
            outcome: None,
            result: None,
            error: None,
            attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance to the next stage on the success path
    ///
    /// `Succeeded` is only reachable through [`Job::succeed`], which writes
    /// the result payload in the same step.
    pub fn advance(&self, to: Stage) -> Result<Job, TransitionError> {
        self.check_not_frozen()?;
        if self.stage.next() != Some(to) || to == Stage::Succeeded {
            return Err(TransitionError::Illegal {
                from: self.stage,
                to,
            });
        }
        Ok(Job {
            stage: to,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Freeze the record as succeeded with its result
    pub fn succeed(&self, result: JobResult) -> Result<Job, TransitionError> {
        self.check_not_frozen()?;
        if self.stage != Stage::Uploading {
            return Err(TransitionError::Illegal {
                from: self.stage,
                to: Stage::Succeeded,
            });
        }
        Ok(Job {
            stage: Stage::Succeeded,
            outcome: Some(Outcome::Succeeded),
            result: Some(result),
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Freeze the record as failed, keeping the stage it reached
    pub fn fail(&self, error: impl Into<String>) -> Result<Job, TransitionError> {
        self.check_not_frozen()?;
        Ok(Job {
            outcome: Some(Outcome::Failed),
            error: Some(error.into()),
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Bump the delivery attempt counter
    pub fn with_incremented_attempts(&self) -> Job {
        Job {
            attempts: self.attempts + 1,
            ..self.clone()
        }
    }

    /// Whether the record is frozen
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    fn check_not_frozen(&self) -> Result<(), TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::Frozen {
                id: self.id.clone(),
                stage: self.stage,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
