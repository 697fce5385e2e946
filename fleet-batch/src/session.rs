//! One resource page, wired end to end.
//!
//! A [`BatchSession`] owns the selection and the displayed list, and holds the
//! injected capabilities. Running a batch is a two step affair: [`prepare`]
//! snapshots the eligible targets into a [`PreparedBatch`] (exposing the
//! confirmation and a progress receiver), and [`execute`] runs it and resets
//! the page. `execute` borrows the session mutably, so the selection cannot
//! change while a batch is in flight.
//!
//! [`prepare`]: BatchSession::prepare
//! [`execute`]: BatchSession::execute

use fleet_core::{ResourceId, ResourceRef};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::action::{BatchAction, ResourceActions};
use crate::action_bar::ActionBar;
use crate::config::OrchestratorConfig;
use crate::eligibility::{Eligibility, EligibilityEvaluator};
use crate::error::{BatchError, Result};
use crate::executor::BatchExecutor;
use crate::job::{BatchJob, BatchOutcome, JobState};
use crate::permissions::PermissionService;
use crate::refresh::{PageBanner, RefreshCoordinator, RefreshOutcome, ResourceCollection};
use crate::report::{BatchReport, Confirmation};
use crate::selection::{SelectionSet, TriState};

/// Predicate deciding which fetched resources are displayed.
pub type DisplayFilter = Box<dyn Fn(&ResourceRef) -> bool + Send + Sync>;

pub struct BatchSession {
    role: String,
    permissions: Arc<dyn PermissionService>,
    actions: Arc<dyn ResourceActions>,
    refresh: RefreshCoordinator,
    evaluator: EligibilityEvaluator,
    selection: SelectionSet,
    resources: Vec<ResourceRef>,
    displayed: Vec<ResourceRef>,
    filter: Option<DisplayFilter>,
    banner: Option<PageBanner>,
    shutdown: CancellationToken,
    cancel_on_teardown: bool,
}

impl BatchSession {
    pub fn new(
        role: impl Into<String>,
        permissions: Arc<dyn PermissionService>,
        actions: Arc<dyn ResourceActions>,
        collection: Arc<dyn ResourceCollection>,
    ) -> Self {
        Self {
            role: role.into(),
            permissions,
            actions,
            refresh: RefreshCoordinator::new(collection),
            evaluator: EligibilityEvaluator::default(),
            selection: SelectionSet::new(),
            resources: Vec::new(),
            displayed: Vec::new(),
            filter: None,
            banner: None,
            shutdown: CancellationToken::new(),
            cancel_on_teardown: true,
        }
    }

    /// Session for `role` (or the configured default) with the permission
    /// table from `config`.
    pub fn from_config(
        config: &OrchestratorConfig,
        role: Option<&str>,
        actions: Arc<dyn ResourceActions>,
        collection: Arc<dyn ResourceCollection>,
    ) -> Self {
        let mut session = Self::new(
            config.resolve_role(role),
            Arc::new(config.permissions()),
            actions,
            collection,
        );
        session.cancel_on_teardown = config.cancel_on_teardown;
        session
    }

    pub fn with_evaluator(mut self, evaluator: EligibilityEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Initial fetch of the page. A failure becomes the page banner.
    pub async fn load(&mut self) -> Option<&PageBanner> {
        let outcome = self.refresh.load().await;
        self.apply_refresh(outcome);
        self.banner.as_ref()
    }

    /// Replace the displayed list (paging). The selection is kept: hidden
    /// members stay selected but drop out of eligibility. The next refresh
    /// replaces this list; use [`set_filter`](Self::set_filter) for a view
    /// that should survive a batch.
    pub fn set_displayed(&mut self, displayed: Vec<ResourceRef>) {
        self.displayed = displayed;
    }

    /// Display only resources matching `filter`, now and after every refresh.
    pub fn set_filter(&mut self, filter: impl Fn(&ResourceRef) -> bool + Send + Sync + 'static) {
        self.filter = Some(Box::new(filter));
        self.apply_filter();
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.apply_filter();
    }

    /// Every resource from the last successful fetch, filtered or not.
    pub fn resources(&self) -> &[ResourceRef] {
        &self.resources
    }

    fn apply_filter(&mut self) {
        self.displayed = match &self.filter {
            Some(filter) => self
                .resources
                .iter()
                .filter(|resource| filter(resource))
                .cloned()
                .collect(),
            None => self.resources.clone(),
        };
    }

    pub fn displayed(&self) -> &[ResourceRef] {
        &self.displayed
    }

    pub fn toggle(&mut self, id: &ResourceId) {
        self.selection.toggle(id);
    }

    /// Header checkbox.
    pub fn select_all_displayed(&mut self) {
        self.selection
            .select_all(self.displayed.iter().map(|resource| &resource.id));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn header_state(&self) -> TriState {
        self.selection
            .tri_state(self.displayed.iter().map(|resource| &resource.id))
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn eligibility(&self) -> Eligibility {
        self.evaluator.evaluate(&self.displayed, &self.selection)
    }

    /// `None` when nothing displayed is selected.
    pub fn action_bar(&self) -> Option<ActionBar> {
        ActionBar::build(&self.eligibility(), self.permissions.as_ref(), &self.role)
    }

    pub fn banner(&self) -> Option<&PageBanner> {
        self.banner.as_ref()
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        TeardownHandle {
            token: self.shutdown.clone(),
            enabled: self.cancel_on_teardown,
        }
    }

    /// Snapshot the eligible targets for `action` into a job.
    pub fn prepare(&self, action: BatchAction) -> Result<PreparedBatch> {
        let key = action.permission_key();
        if !self.permissions.has_permission(&self.role, key) {
            return Err(BatchError::PermissionDenied {
                role: self.role.clone(),
                key: key.to_string(),
            });
        }

        let targets = self
            .evaluator
            .eligible_targets(&self.displayed, &self.selection, action);
        if targets.is_empty() {
            return Err(BatchError::NothingEligible(action));
        }

        let job = BatchJob::new(action, targets);
        let confirmation = Confirmation::for_job(&job);
        let cancel = self.shutdown.child_token();
        let executor = BatchExecutor::new().with_cancellation(cancel.clone());
        debug!(batch_id = %job.id(), "Prepared {} of {} resource(s)", action, job.total());

        Ok(PreparedBatch {
            job,
            confirmation,
            confirmed: false,
            executor,
            cancel,
        })
    }

    /// Run a prepared batch, then clear the selection and refetch once.
    pub async fn execute(&mut self, prepared: PreparedBatch) -> Result<CompletedBatch> {
        if prepared.needs_confirmation() {
            return Err(BatchError::ConfirmationRequired {
                action: prepared.job.action(),
                count: prepared.job.total(),
            });
        }

        let outcome = prepared
            .executor
            .run_with(&prepared.job, self.actions.as_ref())
            .await;
        let report = BatchReport::from_outcome(&outcome);
        info!("{}", report.summary());

        let refreshed = self.refresh.after_batch(&mut self.selection).await;
        self.apply_refresh(refreshed);

        Ok(CompletedBatch { outcome, report })
    }

    /// Back to a clean page: no selection, no banner.
    pub fn reset(&mut self) {
        self.selection.clear();
        self.banner = None;
    }

    fn apply_refresh(&mut self, outcome: RefreshOutcome) {
        match outcome {
            RefreshOutcome::Refreshed(resources) => {
                self.resources = resources;
                self.apply_filter();
                self.banner = None;
            }
            RefreshOutcome::Failed(banner) => self.banner = Some(banner),
        }
    }
}

impl Drop for BatchSession {
    fn drop(&mut self) {
        if self.cancel_on_teardown {
            self.shutdown.cancel();
        }
    }
}

/// Cancels in-flight batches when the page goes away.
#[derive(Debug, Clone)]
pub struct TeardownHandle {
    token: CancellationToken,
    enabled: bool,
}

impl TeardownHandle {
    pub fn teardown(&self) {
        if self.enabled {
            self.token.cancel();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A job ready to run, pending confirmation for destructive actions.
pub struct PreparedBatch {
    job: BatchJob,
    confirmation: Option<Confirmation>,
    confirmed: bool,
    executor: BatchExecutor,
    cancel: CancellationToken,
}

impl PreparedBatch {
    pub fn job(&self) -> &BatchJob {
        &self.job
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    pub fn needs_confirmation(&self) -> bool {
        self.confirmation.is_some() && !self.confirmed
    }

    pub fn confirm(&mut self) {
        self.confirmed = true;
    }

    /// Progress of this batch, starting at [`JobState::Idle`].
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.executor.subscribe()
    }

    /// Cancels this batch only; the session stays usable.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

#[derive(Debug, Clone)]
pub struct CompletedBatch {
    pub outcome: BatchOutcome,
    pub report: BatchReport,
}
