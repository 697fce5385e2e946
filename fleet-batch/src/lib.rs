//! Multi-resource batch operation orchestration.
//!
//! The pieces follow the life of one batch on a resource page:
//! [`SelectionSet`] tracks which rows are marked, [`EligibilityEvaluator`] and
//! the injected [`PermissionService`] decide which [`ActionBar`] controls show,
//! a [`BatchJob`] snapshots the eligible targets, [`BatchExecutor`] runs them
//! strictly one at a time, [`BatchReport`] turns the outcome into what the
//! result dialog shows, and [`RefreshCoordinator`] resets the page afterwards.
//! [`BatchSession`] wires all of it together for a front end.

pub mod action;
pub mod action_bar;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod executor;
pub mod job;
pub mod permissions;
pub mod refresh;
pub mod report;
pub mod selection;
pub mod session;

pub use action::{ActionError, ActionErrorKind, BatchAction, ResourceActions};
pub use action_bar::{ActionBar, ActionControl};
pub use config::OrchestratorConfig;
pub use eligibility::{Eligibility, EligibilityEvaluator, Precondition, PreconditionTable};
pub use error::{BatchError, Result};
pub use executor::BatchExecutor;
pub use job::{BatchJob, BatchOutcome, FailureLog, JobState, Progress, TargetFailure};
pub use permissions::{PermissionService, PermissionSet, RolePermissions};
pub use refresh::{PageBanner, RefreshCoordinator, RefreshOutcome, ResourceCollection};
pub use report::{BatchReport, Confirmation, DialogState};
pub use selection::{SelectionSet, TriState};
pub use session::{BatchSession, CompletedBatch, DisplayFilter, PreparedBatch, TeardownHandle};
