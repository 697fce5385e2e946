use chrono::{DateTime, Utc};
use fleet_core::{ResourceId, ResourceRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::action::{ActionError, ActionErrorKind, BatchAction};

/// One user-initiated run of a single action over a fixed set of targets.
#[derive(Debug, Clone)]
pub struct BatchJob {
    id: Uuid,
    action: BatchAction,
    targets: Arc<[ResourceRef]>,
}

impl BatchJob {
    pub fn new(action: BatchAction, targets: Vec<ResourceRef>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            targets: targets.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn action(&self) -> BatchAction {
        self.action
    }

    /// Targets in execution order. Fixed at creation.
    pub fn targets(&self) -> &[ResourceRef] {
        &self.targets
    }

    pub fn total(&self) -> usize {
        self.targets.len()
    }

    pub fn target_names(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self { done: 0, total }
    }

    pub(crate) fn advance(&mut self) {
        debug_assert!(self.done < self.total, "progress advanced past total");
        self.done += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.done == self.total
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.done * 100) / self.total) as u8
    }
}

/// What the progress indicator observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Running(Progress),
    Completed { progress: Progress, failures: usize },
    Cancelled { progress: Progress, skipped: usize },
}

impl JobState {
    pub fn progress(&self) -> Option<Progress> {
        match self {
            JobState::Idle => None,
            JobState::Running(progress)
            | JobState::Completed { progress, .. }
            | JobState::Cancelled { progress, .. } => Some(*progress),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Cancelled { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFailure {
    pub id: ResourceId,
    pub name: String,
    pub kind: ActionErrorKind,
    pub message: String,
}

impl TargetFailure {
    pub fn new(target: &ResourceRef, error: ActionError) -> Self {
        Self {
            id: target.id.clone(),
            name: target.name.clone(),
            kind: error.kind,
            message: error.message,
        }
    }
}

/// Append-only record of failed targets, written by the executor alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureLog {
    entries: Vec<TargetFailure>,
}

impl FailureLog {
    pub(crate) fn push(&mut self, failure: TargetFailure) {
        self.entries.push(failure);
    }

    pub fn as_slice(&self) -> &[TargetFailure] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<TargetFailure> {
        self.entries
    }
}

/// Result of running a [`BatchJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub job_id: Uuid,
    pub action: BatchAction,
    pub progress: Progress,
    pub errors: Vec<TargetFailure>,
    /// Targets never attempted because the job was cancelled.
    pub skipped: Vec<ResourceRef>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchOutcome {
    pub fn is_cancelled(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.progress.done - self.errors.len()
    }

    pub fn final_state(&self) -> JobState {
        if self.is_cancelled() {
            JobState::Cancelled {
                progress: self.progress,
                skipped: self.skipped.len(),
            }
        } else {
            JobState::Completed {
                progress: self.progress,
                failures: self.errors.len(),
            }
        }
    }
}
