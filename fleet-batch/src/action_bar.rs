//! Batch action bar: eligibility and permissions combined.
//!
//! A control is rendered only when the role holds its permission key, and is
//! enabled only when at least one selected resource is eligible. With nothing
//! selected there is no bar at all.

use crate::action::BatchAction;
use crate::eligibility::Eligibility;
use crate::permissions::PermissionService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionControl {
    pub action: BatchAction,
    pub eligible: usize,
    pub enabled: bool,
}

impl ActionControl {
    pub fn label(&self) -> String {
        let mut label = self.action.title().to_string();
        if self.eligible > 0 {
            label.push_str(&format!(" ({})", self.eligible));
        }
        label
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBar {
    selected: usize,
    controls: Vec<ActionControl>,
}

impl ActionBar {
    pub fn build(
        eligibility: &Eligibility,
        permissions: &dyn PermissionService,
        role: &str,
    ) -> Option<Self> {
        if eligibility.is_empty() {
            return None;
        }

        let controls = BatchAction::ALL
            .into_iter()
            .filter(|action| permissions.has_permission(role, action.permission_key()))
            .map(|action| ActionControl {
                action,
                eligible: eligibility.eligible_count(action),
                enabled: eligibility.any_eligible(action),
            })
            .collect();

        Some(Self {
            selected: eligibility.selected_count(),
            controls,
        })
    }

    pub fn selected_count(&self) -> usize {
        self.selected
    }

    pub fn controls(&self) -> &[ActionControl] {
        &self.controls
    }

    pub fn control(&self, action: BatchAction) -> Option<&ActionControl> {
        self.controls.iter().find(|c| c.action == action)
    }

    pub fn is_enabled(&self, action: BatchAction) -> bool {
        self.control(action).is_some_and(|c| c.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::EligibilityEvaluator;
    use crate::permissions::{RolePermissions, START_STOP, WILDCARD};
    use crate::selection::SelectionSet;
    use fleet_core::{LifecycleState, ResourceRef};

    fn permissions() -> RolePermissions {
        RolePermissions::new()
            .with_role("admin", [WILDCARD])
            .with_role("operator", [START_STOP])
    }

    fn eligibility_for(states: &[LifecycleState]) -> Eligibility {
        let displayed: Vec<_> = states
            .iter()
            .enumerate()
            .map(|(i, state)| ResourceRef::new(format!("r{i}"), format!("r{i}"), state.clone()))
            .collect();
        let mut selection = SelectionSet::new();
        selection.select_all(displayed.iter().map(|r| &r.id));
        EligibilityEvaluator::default().evaluate(&displayed, &selection)
    }

    #[test]
    fn test_no_bar_without_selection() {
        let bar = ActionBar::build(&Eligibility::default(), &permissions(), "admin");
        assert_eq!(bar, None);
    }

    #[test]
    fn test_admin_sees_everything() {
        let eligibility = eligibility_for(&[LifecycleState::Running, LifecycleState::Stopped]);
        let bar = ActionBar::build(&eligibility, &permissions(), "admin").unwrap();

        assert_eq!(bar.selected_count(), 2);
        assert_eq!(bar.controls().len(), 3);
        assert!(bar.is_enabled(BatchAction::Start));
        assert!(bar.is_enabled(BatchAction::Stop));
        assert!(bar.is_enabled(BatchAction::Delete));
        assert_eq!(bar.control(BatchAction::Delete).unwrap().label(), "Delete (2)");
    }

    #[test]
    fn test_missing_permission_hides_control() {
        let eligibility = eligibility_for(&[LifecycleState::Running]);
        let bar = ActionBar::build(&eligibility, &permissions(), "operator").unwrap();

        assert!(bar.control(BatchAction::Delete).is_none());
        assert!(bar.is_enabled(BatchAction::Stop));
        assert!(!bar.is_enabled(BatchAction::Delete));
    }

    #[test]
    fn test_ineligible_control_is_disabled() {
        let eligibility = eligibility_for(&[LifecycleState::Running]);
        let bar = ActionBar::build(&eligibility, &permissions(), "admin").unwrap();

        let start = bar.control(BatchAction::Start).unwrap();
        assert!(!start.enabled);
        assert_eq!(start.label(), "Start");
    }
}
