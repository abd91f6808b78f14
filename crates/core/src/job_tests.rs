// SPDX-License-Identifier: MIT

use super::*;
use crate::analysis::{JobResult, RepoAnalysis};
use proptest::prelude::*;

fn sample_result() -> JobResult {
    JobResult {
        doc_url: "http://localhost:7272/docs/job-1/README.md".to_string(),
        repo_name: "acme_widgets".to_string(),
        analysis: RepoAnalysis::default(),
    }
}

#[test]
fn new_job_starts_queued_and_open() {
    let job = Job::new("job-1", "https://github.com/acme/widgets");
    assert_eq!(job.stage, Stage::Queued);
    assert_eq!(job.outcome, None);
    assert!(job.result.is_none());
    assert!(job.error.is_none());
}

#[test]
fn stages_advance_in_fixed_order() {
    let job = Job::new("job-1", "https://github.com/acme/widgets");
    let job = job.advance(Stage::Cloning).unwrap();
    let job = job.advance(Stage::Analyzing).unwrap();
    let job = job.advance(Stage::Generating).unwrap();
    let job = job.advance(Stage::Uploading).unwrap();
    assert_eq!(job.stage, Stage::Uploading);
}

#[test]
fn skipping_a_stage_is_illegal() {
    let job = Job::new("job-1", "https://github.com/acme/widgets");
    let err = job.advance(Stage::Analyzing).unwrap_err();
    assert!(matches!(err, TransitionError::Illegal { .. }));
}

#[test]
fn regressing_a_stage_is_illegal() {
    let job = Job::new("job-1", "https://github.com/acme/widgets")
        .advance(Stage::Cloning)
        .unwrap()
        .advance(Stage::Analyzing)
        .unwrap();
    let err = job.advance(Stage::Cloning).unwrap_err();
    assert!(matches!(err, TransitionError::Illegal { .. }));
}

#[test]
fn succeed_requires_uploading_stage() {
    let job = Job::new("job-1", "https://github.com/acme/widgets");
    assert!(job.succeed(sample_result()).is_err());

    let job = job
        .advance(Stage::Cloning)
        .unwrap()
        .advance(Stage::Analyzing)
        .unwrap()
        .advance(Stage::Generating)
        .unwrap()
        .advance(Stage::Uploading)
        .unwrap();
    let job = job.succeed(sample_result()).unwrap();
    assert_eq!(job.stage, Stage::Succeeded);
    assert_eq!(job.outcome, Some(Outcome::Succeeded));
    assert!(job.result.is_some());
    assert!(job.error.is_none());
}

#[test]
fn advance_cannot_reach_succeeded_without_payload() {
    let job = Job::new("job-1", "https://github.com/acme/widgets")
        .advance(Stage::Cloning)
        .unwrap()
        .advance(Stage::Analyzing)
        .unwrap()
        .advance(Stage::Generating)
        .unwrap()
        .advance(Stage::Uploading)
        .unwrap();
    assert!(job.advance(Stage::Succeeded).is_err());
}

#[test]
fn fail_keeps_the_stage_reached() {
    let job = Job::new("job-1", "https://github.com/acme/widgets")
        .advance(Stage::Cloning)
        .unwrap();
    let job = job.fail("clone failed: repository not found").unwrap();
    assert_eq!(job.stage, Stage::Cloning);
    assert_eq!(job.outcome, Some(Outcome::Failed));
    assert!(job.error.is_some());
    assert!(job.result.is_none());
}

#[test]
fn frozen_records_reject_all_transitions() {
    let job = Job::new("job-1", "https://github.com/acme/widgets")
        .advance(Stage::Cloning)
        .unwrap()
        .fail("network error")
        .unwrap();

    assert!(matches!(
        job.advance(Stage::Analyzing),
        Err(TransitionError::Frozen { .. })
    ));
    assert!(matches!(
        job.fail("again"),
        Err(TransitionError::Frozen { .. })
    ));
    assert!(matches!(
        job.succeed(sample_result()),
        Err(TransitionError::Frozen { .. })
    ));
}

#[test]
fn result_and_error_are_mutually_exclusive() {
    let failed = Job::new("a", "u")
        .advance(Stage::Cloning)
        .unwrap()
        .fail("boom")
        .unwrap();
    assert!(failed.error.is_some() && failed.result.is_none());

    let succeeded = Job::new("b", "u")
        .advance(Stage::Cloning)
        .unwrap()
        .advance(Stage::Analyzing)
        .unwrap()
        .advance(Stage::Generating)
        .unwrap()
        .advance(Stage::Uploading)
        .unwrap()
        .succeed(sample_result())
        .unwrap();
    assert!(succeeded.result.is_some() && succeeded.error.is_none());
}

#[test]
fn transitions_bump_updated_at() {
    let job = Job::new("job-1", "u");
    let before = job.updated_at;
    let job = job.advance(Stage::Cloning).unwrap();
    assert!(job.updated_at >= before);
}

#[test]
fn job_round_trips_through_json() {
    let job = Job::new("job-1", "https://github.com/acme/widgets")
        .advance(Stage::Cloning)
        .unwrap();
    let json = serde_json::to_string(&job).unwrap();
    let back: Job = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, job.id);
    assert_eq!(back.stage, Stage::Cloning);
}

proptest! {
    /// Observed stages form a non-decreasing sequence under the total
    /// order, whatever mix of legal and rejected transitions is attempted.
    #[test]
    fn observed_stages_never_decrease(attempts in prop::collection::vec(0u8..7, 1..40)) {
        let mut job = Job::new("job-p", "https://github.com/acme/widgets");
        let mut observed = vec![job.stage];

        for a in attempts {
            let next = match a {
                0 => job.advance(Stage::Cloning),
                1 => job.advance(Stage::Analyzing),
                2 => job.advance(Stage::Generating),
                3 => job.advance(Stage::Uploading),
                4 => job.advance(Stage::Succeeded),
                5 => job.succeed(sample_result()),
                _ => job.fail("injected"),
            };
            if let Ok(j) = next {
                job = j;
            }
            observed.push(job.stage);
        }

        prop_assert!(observed.windows(2).all(|w| w[0] <= w[1]));
    }
}
