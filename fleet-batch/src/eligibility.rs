//! Which batch actions make sense for the current selection.
//!
//! An action is offered as soon as one selected, displayed resource satisfies
//! its precondition. Running it only ever targets that eligible subset; the
//! other members are left out of the job without being reported.

use fleet_core::{LifecycleState, ResourceRef, StateClass};

use crate::action::BatchAction;
use crate::selection::SelectionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    Any,
    Requires(StateClass),
}

impl Precondition {
    pub fn admits(&self, state: &LifecycleState) -> bool {
        match self {
            Precondition::Any => true,
            Precondition::Requires(class) => state.class() == *class,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreconditionTable {
    pub start: Precondition,
    pub stop: Precondition,
    pub delete: Precondition,
}

impl Default for PreconditionTable {
    fn default() -> Self {
        Self {
            start: Precondition::Requires(StateClass::Startable),
            stop: Precondition::Requires(StateClass::Stoppable),
            delete: Precondition::Any,
        }
    }
}

impl PreconditionTable {
    pub fn precondition(&self, action: BatchAction) -> Precondition {
        match action {
            BatchAction::Start => self.start,
            BatchAction::Stop => self.stop,
            BatchAction::Delete => self.delete,
        }
    }

    pub fn admits(&self, action: BatchAction, resource: &ResourceRef) -> bool {
        self.precondition(action).admits(&resource.state)
    }
}

/// Per-action eligibility of one selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Eligibility {
    selected: usize,
    start: usize,
    stop: usize,
    delete: usize,
}

impl Eligibility {
    /// Selected members that are currently displayed.
    pub fn selected_count(&self) -> usize {
        self.selected
    }

    pub fn eligible_count(&self, action: BatchAction) -> usize {
        match action {
            BatchAction::Start => self.start,
            BatchAction::Stop => self.stop,
            BatchAction::Delete => self.delete,
        }
    }

    pub fn any_eligible(&self, action: BatchAction) -> bool {
        self.eligible_count(action) > 0
    }

    /// True when nothing displayed is selected; the action surface is hidden.
    pub fn is_empty(&self) -> bool {
        self.selected == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct EligibilityEvaluator {
    table: PreconditionTable,
}

impl EligibilityEvaluator {
    pub fn new(table: PreconditionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PreconditionTable {
        &self.table
    }

    pub fn evaluate(&self, displayed: &[ResourceRef], selection: &SelectionSet) -> Eligibility {
        if selection.is_empty() {
            return Eligibility::default();
        }

        displayed
            .iter()
            .filter(|resource| selection.is_selected(&resource.id))
            .fold(Eligibility::default(), |mut acc, resource| {
                acc.selected += 1;
                if self.table.admits(BatchAction::Start, resource) {
                    acc.start += 1;
                }
                if self.table.admits(BatchAction::Stop, resource) {
                    acc.stop += 1;
                }
                if self.table.admits(BatchAction::Delete, resource) {
                    acc.delete += 1;
                }
                acc
            })
    }

    /// Display-ordered snapshot of the resources a job for `action` targets.
    pub fn eligible_targets(
        &self,
        displayed: &[ResourceRef],
        selection: &SelectionSet,
        action: BatchAction,
    ) -> Vec<ResourceRef> {
        displayed
            .iter()
            .filter(|resource| selection.is_selected(&resource.id))
            .filter(|resource| self.table.admits(action, resource))
            .cloned()
            .collect()
    }
}
