//! What the user sees before and after a batch runs.

use serde::Serialize;
use uuid::Uuid;

use crate::action::BatchAction;
use crate::job::{BatchJob, BatchOutcome, TargetFailure};

/// Pre-execution confirmation for destructive batches, listing every target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub action: BatchAction,
    pub names: Vec<String>,
}

impl Confirmation {
    /// `None` for actions that run without a confirmation step.
    pub fn for_job(job: &BatchJob) -> Option<Self> {
        job.action().is_destructive().then(|| Self {
            action: job.action(),
            names: job.target_names(),
        })
    }

    pub fn prompt(&self) -> String {
        format!(
            "{} {} resource(s)? This cannot be undone.",
            self.action.title(),
            self.names.len()
        )
    }
}

/// Result dialog state once a batch has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    /// Everything succeeded; the dialog closes by itself.
    Dismissed,
    /// At least one failure; the dialog stays open and lists them.
    Failures(Vec<TargetFailure>),
    /// The batch was cancelled before every target ran. The dialog stays
    /// open with the failures so far and the names never attempted.
    Cancelled {
        failures: Vec<TargetFailure>,
        skipped: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub job_id: Uuid,
    pub action: BatchAction,
    pub total: usize,
    pub attempted: usize,
    pub failures: Vec<TargetFailure>,
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn from_outcome(outcome: &BatchOutcome) -> Self {
        Self {
            job_id: outcome.job_id,
            action: outcome.action,
            total: outcome.progress.total,
            attempted: outcome.progress.done,
            failures: outcome.errors.clone(),
            skipped: outcome.skipped.iter().map(|t| t.name.clone()).collect(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    /// Some, but not all, targets failed.
    pub fn is_partial_failure(&self) -> bool {
        !self.failures.is_empty() && self.failures.len() < self.total
    }

    /// Only a fully completed, failure-free batch dismisses the dialog.
    pub fn dialog(&self) -> DialogState {
        if !self.skipped.is_empty() {
            DialogState::Cancelled {
                failures: self.failures.clone(),
                skipped: self.skipped.clone(),
            }
        } else if self.failures.is_empty() {
            DialogState::Dismissed
        } else {
            DialogState::Failures(self.failures.clone())
        }
    }

    /// Failed batches are closed and re-initiated, never retried in place.
    pub fn can_proceed(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = if self.failures.is_empty() {
            format!("{} of {} succeeded", self.succeeded(), self.total)
        } else {
            format!(
                "{} of {} succeeded, {} failed",
                self.succeeded(),
                self.total,
                self.failures.len()
            )
        };
        if !self.skipped.is_empty() {
            summary.push_str(&format!(", {} not attempted", self.skipped.len()));
        }
        summary
    }

    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} batch: {}",
            self.action.title(),
            self.summary()
        )];
        for failure in &self.failures {
            lines.push(format!("  ✗ {}: {}", failure.name, failure.message));
        }
        for name in &self.skipped {
            lines.push(format!("  - {name} (cancelled)"));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionErrorKind;
    use crate::job::Progress;
    use chrono::Utc;
    use fleet_core::{LifecycleState, ResourceId, ResourceRef};

    fn outcome(total: usize, failed: &[(&str, &str)]) -> BatchOutcome {
        BatchOutcome {
            job_id: Uuid::new_v4(),
            action: BatchAction::Stop,
            progress: Progress { done: total, total },
            errors: failed
                .iter()
                .map(|(name, message)| TargetFailure {
                    id: ResourceId::new(*name),
                    name: name.to_string(),
                    kind: ActionErrorKind::Unknown,
                    message: message.to_string(),
                })
                .collect(),
            skipped: Vec::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_success_dismisses() {
        let report = BatchReport::from_outcome(&outcome(3, &[]));
        assert!(report.is_success());
        assert!(!report.is_partial_failure());
        assert!(report.can_proceed());
        assert_eq!(report.dialog(), DialogState::Dismissed);
        assert_eq!(report.summary(), "3 of 3 succeeded");
    }

    #[test]
    fn test_partial_failure_keeps_dialog_open() {
        let report = BatchReport::from_outcome(&outcome(2, &[("vmC", "quota exceeded")]));

        assert!(report.is_partial_failure());
        assert!(!report.can_proceed());
        match report.dialog() {
            DialogState::Failures(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].name, "vmC");
                assert_eq!(failures[0].message, "quota exceeded");
            }
            other => panic!("dialog should list failures, got {other:?}"),
        }
        assert_eq!(
            report.render_lines(),
            vec![
                "Stop batch: 1 of 2 succeeded, 1 failed".to_string(),
                "  ✗ vmC: quota exceeded".to_string(),
            ]
        );
    }

    #[test]
    fn test_cancelled_batch_keeps_dialog_open() {
        let mut outcome = outcome(3, &[]);
        outcome.progress.done = 1;
        outcome.skipped = vec![
            ResourceRef::new("b", "beta", LifecycleState::Running),
            ResourceRef::new("c", "gamma", LifecycleState::Running),
        ];
        let report = BatchReport::from_outcome(&outcome);

        assert!(!report.is_success());
        assert_eq!(
            report.dialog(),
            DialogState::Cancelled {
                failures: Vec::new(),
                skipped: vec!["beta".to_string(), "gamma".to_string()],
            }
        );
        assert_eq!(report.summary(), "1 of 3 succeeded, 2 not attempted");
    }

    #[test]
    fn test_total_failure_is_not_partial() {
        let report = BatchReport::from_outcome(&outcome(1, &[("vmA", "boom")]));
        assert!(!report.is_partial_failure());
        assert!(!report.is_success());
    }

    #[test]
    fn test_report_serializes_tagged_failures() {
        let mut outcome = outcome(2, &[("vmC", "quota exceeded")]);
        outcome.errors[0].kind = ActionErrorKind::HttpError { status: 429 };

        let json = serde_json::to_value(BatchReport::from_outcome(&outcome)).unwrap();
        assert_eq!(json["action"], "stop");
        assert_eq!(json["failures"][0]["name"], "vmC");
        assert_eq!(json["failures"][0]["kind"]["type"], "http_error");
        assert_eq!(json["failures"][0]["kind"]["status"], 429);
    }

    #[test]
    fn test_confirmation_only_for_delete() {
        let targets = vec![
            ResourceRef::new("a", "alpha", LifecycleState::Running),
            ResourceRef::new("b", "beta", LifecycleState::Stopped),
        ];
        let stop = BatchJob::new(BatchAction::Stop, targets.clone());
        assert_eq!(Confirmation::for_job(&stop), None);

        let delete = BatchJob::new(BatchAction::Delete, targets);
        let confirmation = Confirmation::for_job(&delete).expect("delete needs confirmation");
        assert_eq!(confirmation.names, vec!["alpha", "beta"]);
        assert_eq!(
            confirmation.prompt(),
            "Delete 2 resource(s)? This cannot be undone."
        );
    }
}
