//! Row selection for batch actions.

use fleet_core::ResourceId;
use std::collections::HashSet;

/// Header checkbox state for a list of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    None,
    Some,
    All,
}

/// Ids marked for a batch action.
///
/// Membership does not depend on whether a row is currently visible, so a
/// filter change never silently drops a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<ResourceId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&mut self, id: &ResourceId) {
        if !self.ids.remove(id) {
            self.ids.insert(id.clone());
        }
    }

    /// Header "select all" over `ids`.
    ///
    /// When every id is already selected this clears the whole selection;
    /// otherwise the selection is replaced by exactly `ids`.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a ResourceId>) {
        let ids: Vec<&ResourceId> = ids.into_iter().collect();
        if ids.iter().all(|id| self.ids.contains(*id)) {
            self.ids.clear();
        } else {
            self.ids = ids.into_iter().cloned().collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &ResourceId) -> bool {
        self.ids.contains(id)
    }

    pub fn tri_state<'a>(&self, ids: impl IntoIterator<Item = &'a ResourceId>) -> TriState {
        let mut total = 0usize;
        let mut selected = 0usize;
        for id in ids {
            total += 1;
            if self.ids.contains(id) {
                selected += 1;
            }
        }

        match selected {
            0 => TriState::None,
            n if n == total => TriState::All,
            _ => TriState::Some,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceId> {
        self.ids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<ResourceId> {
        raw.iter().map(|id| ResourceId::new(*id)).collect()
    }

    #[test]
    fn test_toggle_twice_restores_selection() {
        let mut selection = SelectionSet::new();
        selection.toggle(&ResourceId::new("a"));
        let before = selection.clone();

        for id in ids(&["a", "b"]) {
            selection.toggle(&id);
            selection.toggle(&id);
            assert_eq!(selection, before);
        }
    }

    #[test]
    fn test_select_all_then_again_clears() {
        let list = ids(&["a", "b"]);
        let mut selection = SelectionSet::new();

        selection.select_all(&list);
        assert_eq!(selection.len(), 2);
        assert!(selection.is_selected(&list[0]));
        assert!(selection.is_selected(&list[1]));

        selection.select_all(&list);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_replaces_instead_of_union() {
        let mut selection = SelectionSet::new();
        selection.toggle(&ResourceId::new("elsewhere"));
        selection.toggle(&ResourceId::new("a"));

        let list = ids(&["a", "b"]);
        selection.select_all(&list);

        assert_eq!(selection.len(), 2);
        assert!(!selection.is_selected(&ResourceId::new("elsewhere")));
    }

    #[test]
    fn test_select_all_when_list_already_covered_clears_everything() {
        let mut selection = SelectionSet::new();
        selection.select_all(&ids(&["a", "b", "c"]));

        // Every listed id is selected, so the header acts as "deselect all",
        // including ids outside the list.
        selection.select_all(&ids(&["a", "b"]));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_tri_state() {
        let list = ids(&["a", "b", "c"]);
        let mut selection = SelectionSet::new();
        assert_eq!(selection.tri_state(&list), TriState::None);

        selection.toggle(&list[1]);
        assert_eq!(selection.tri_state(&list), TriState::Some);

        selection.select_all(&list);
        assert_eq!(selection.tri_state(&list), TriState::All);

        assert_eq!(selection.tri_state(std::iter::empty()), TriState::None);
    }

    #[test]
    fn test_membership_survives_filtering() {
        let mut selection = SelectionSet::new();
        selection.toggle(&ResourceId::new("hidden"));
        assert_eq!(selection.tri_state(&ids(&["visible"])), TriState::None);
        assert!(selection.is_selected(&ResourceId::new("hidden")));
    }

    #[test]
    fn test_select_all_over_empty_list_clears_selection() {
        let mut selection = SelectionSet::new();
        selection.toggle(&ResourceId::new("a"));
        selection.toggle(&ResourceId::new("b"));

        selection.select_all(std::iter::empty());
        assert!(selection.is_empty());
    }
}
