// SPDX-License-Identifier: MIT

//! Lease queue with visibility-timeout support
//!
//! Job ids wait in FIFO order. A claim makes an id invisible to further
//! claims for the lease duration; if the owning worker does not complete
//! the claim before the lease expires, the id returns to the queue with
//! its attempt counter bumped. Ids that exhaust their attempts are parked
//! in a dead-letter list instead of cycling forever.
//!
//! Claims are deliberately not serialized: a process restart drops them,
//! and recovery re-enqueues any non-terminal job, which is the
//! retry-from-queued discipline the pipeline relies on.

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// An id waiting to be dispatched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedJob {
    pub job_id: String,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: u32,
}

/// A claimed id with lease tracking
#[derive(Debug, Clone)]
pub struct ClaimedJob {
    pub job_id: String,
    pub claim_id: String,
    pub claimed_at: Instant,
    pub visible_after: Instant,
    pub attempts: u32,
}

/// An id that exceeded its delivery attempts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetter {
    pub job_id: String,
    pub reason: String,
    pub dead_at: DateTime<Utc>,
}

/// Ids returned to circulation or parked by a lease sweep
#[derive(Debug, Default)]
pub struct TickReport {
    pub requeued: Vec<String>,
    pub dead: Vec<String>,
}

fn default_lease() -> Duration {
    Duration::from_secs(600)
}

fn default_max_attempts() -> u32 {
    3
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// FIFO queue of job ids with at-most-one-active-claim-per-id semantics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseQueue {
    items: Vec<QueuedJob>,
    #[serde(skip, default)]
    claimed: Vec<ClaimedJob>,
    dead_letters: Vec<DeadLetter>,
    #[serde(with = "duration_secs", default = "default_lease")]
    lease: Duration,
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,
}

impl Default for LeaseQueue {
    fn default() -> Self {
        Self::new(default_lease())
    }
}

impl LeaseQueue {
    pub fn new(lease: Duration) -> Self {
        Self {
            items: Vec::new(),
            claimed: Vec::new(),
            dead_letters: Vec::new(),
            lease,
            max_attempts: default_max_attempts(),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Apply current settings to a queue restored from disk
    pub fn reconfigure(&mut self, lease: Duration, max_attempts: u32) {
        self.lease = lease;
        self.max_attempts = max_attempts;
    }

    /// Make an id visible to workers; a duplicate push is a no-op
    pub fn push(&mut self, job_id: impl Into<String>) {
        let job_id = job_id.into();
        if self.contains(&job_id) {
            return;
        }
        self.items.push(QueuedJob {
            job_id,
            enqueued_at: Utc::now(),
            attempts: 0,
        });
    }

    /// Claim the head of the queue for the lease duration
    ///
    /// Returns `None` if nothing is waiting. A claimed id is invisible to
    /// further claims until its lease expires.
    pub fn claim(&mut self, claim_id: impl Into<String>, clock: &impl Clock) -> Option<String> {
        if self.items.is_empty() {
            return None;
        }
        let now = clock.now();
        let item = self.items.remove(0);
        let job_id = item.job_id.clone();
        self.claimed.push(ClaimedJob {
            job_id: item.job_id,
            claim_id: claim_id.into(),
            claimed_at: now,
            visible_after: now + self.lease,
            attempts: item.attempts,
        });
        Some(job_id)
    }

    /// Acknowledge a claim: the job reached a terminal state
    pub fn complete(&mut self, claim_id: &str) -> Option<String> {
        let idx = self.claimed.iter().position(|c| c.claim_id == claim_id)?;
        Some(self.claimed.remove(idx).job_id)
    }

    /// Hand a claim back without acknowledging it
    pub fn release(&mut self, claim_id: &str) -> Option<String> {
        let idx = self.claimed.iter().position(|c| c.claim_id == claim_id)?;
        let claim = self.claimed.remove(idx);
        Some(self.requeue_or_park(claim, "released"))
    }

    /// Return expired claims to circulation; called periodically
    pub fn tick(&mut self, clock: &impl Clock) -> TickReport {
        let now = clock.now();
        let mut report = TickReport::default();

        let expired: Vec<ClaimedJob> = {
            let (expired, active): (Vec<_>, Vec<_>) = self
                .claimed
                .drain(..)
                .partition(|c| now >= c.visible_after);
            self.claimed = active;
            expired
        };

        for claim in expired {
            let job_id = claim.job_id.clone();
            if claim.attempts + 1 >= self.max_attempts {
                self.park(claim, "lease expired too many times");
                report.dead.push(job_id);
            } else {
                self.requeue_or_park(claim, "lease expired");
                report.requeued.push(job_id);
            }
        }

        report
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn claimed_len(&self) -> usize {
        self.claimed.len()
    }

    pub fn dead_letters(&self) -> &[DeadLetter] {
        &self.dead_letters
    }

    /// Whether an id is anywhere in the queue: waiting, claimed, or parked
    pub fn contains(&self, job_id: &str) -> bool {
        self.items.iter().any(|i| i.job_id == job_id)
            || self.claimed.iter().any(|c| c.job_id == job_id)
            || self.dead_letters.iter().any(|d| d.job_id == job_id)
    }

    fn requeue_or_park(&mut self, claim: ClaimedJob, reason: &str) -> String {
        let job_id = claim.job_id.clone();
        if claim.attempts + 1 >= self.max_attempts {
            self.park(claim, reason);
        } else {
            self.items.push(QueuedJob {
                job_id: claim.job_id,
                enqueued_at: Utc::now(),
                attempts: claim.attempts + 1,
            });
        }
        job_id
    }

    fn park(&mut self, claim: ClaimedJob, reason: &str) {
        tracing::warn!(job_id = %claim.job_id, reason, "dead-lettering job");
        self.dead_letters.push(DeadLetter {
            job_id: claim.job_id,
            reason: reason.to_string(),
            dead_at: Utc::now(),
        });
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
