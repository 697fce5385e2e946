//! Sequential execution of a batch job.
//!
//! Targets run strictly one after another: each action settles before the
//! next one is issued. Progress only ever moves forward by one per target and
//! a failing target never stops the rest of the batch.

use chrono::Utc;
use fleet_core::ResourceRef;
use std::future::Future;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::action::{ActionError, ResourceActions};
use crate::job::{BatchJob, BatchOutcome, FailureLog, JobState, Progress, TargetFailure};

pub struct BatchExecutor {
    state_tx: watch::Sender<JobState>,
    cancel: Option<CancellationToken>,
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchExecutor {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(JobState::Idle);
        Self {
            state_tx,
            cancel: None,
        }
    }

    /// Stop issuing actions once `token` is cancelled. Checked between
    /// targets; an action already in flight always settles.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Receiver for the progress indicator.
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> JobState {
        *self.state_tx.borrow()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|token| token.is_cancelled())
    }

    /// Run `job` through `action_fn`, one target at a time.
    pub async fn run<F, Fut>(&self, job: &BatchJob, mut action_fn: F) -> BatchOutcome
    where
        F: FnMut(ResourceRef) -> Fut,
        Fut: Future<Output = Result<(), ActionError>>,
    {
        let span = info_span!(
            "batch_job",
            batch_id = %job.id(),
            action = %job.action(),
            total = job.total()
        );

        async {
            let started_at = Utc::now();
            let mut progress = Progress::new(job.total());
            let mut errors = FailureLog::default();
            let mut skipped = Vec::new();

            info!("Starting batch {} of {} resource(s)", job.action(), job.total());
            self.state_tx.send_replace(JobState::Running(progress));

            for (index, target) in job.targets().iter().enumerate() {
                if self.is_cancelled() {
                    skipped.extend(job.targets()[index..].iter().cloned());
                    warn!(
                        "Batch cancelled with {} target(s) not attempted",
                        skipped.len()
                    );
                    break;
                }

                debug!(resource_id = %target.id, resource = %target.name, "Issuing {}", job.action());
                if let Err(err) = action_fn(target.clone()).await {
                    warn!(
                        resource_id = %target.id,
                        resource = %target.name,
                        kind = ?err.kind,
                        "Batch target failed: {}",
                        err.message
                    );
                    errors.push(TargetFailure::new(target, err));
                }

                progress.advance();
                self.state_tx.send_replace(JobState::Running(progress));
            }

            let outcome = BatchOutcome {
                job_id: job.id(),
                action: job.action(),
                progress,
                errors: errors.into_vec(),
                skipped,
                started_at,
                finished_at: Utc::now(),
            };

            info!(
                "Batch finished: {} succeeded, {} failed, {} skipped",
                outcome.succeeded(),
                outcome.errors.len(),
                outcome.skipped.len()
            );
            self.state_tx.send_replace(outcome.final_state());
            outcome
        }
        .instrument(span)
        .await
    }

    /// Run `job` against a provider capability.
    pub async fn run_with(&self, job: &BatchJob, actions: &dyn ResourceActions) -> BatchOutcome {
        let action = job.action();
        self.run(job, |target| async move { actions.apply(action, &target).await })
            .await
    }
}
