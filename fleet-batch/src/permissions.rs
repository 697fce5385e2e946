//! Role based gating of batch action controls.
//!
//! The orchestrator only ever asks one question, "may this role use this
//! permission key", through [`PermissionService`]. [`RolePermissions`] is the
//! in-memory table loaded once per session from configuration.

use std::collections::{BTreeSet, HashMap};

pub const START_STOP: &str = "resources.start_stop";
pub const DELETE: &str = "resources.delete";

/// Grants every permission key to the roles that list it.
pub const WILDCARD: &str = "*";

pub trait PermissionService: Send + Sync {
    fn has_permission(&self, role: &str, key: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionSet {
    All,
    Keys(BTreeSet<String>),
}

impl PermissionSet {
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        if keys.contains(WILDCARD) {
            PermissionSet::All
        } else {
            PermissionSet::Keys(keys)
        }
    }

    pub fn allows(&self, key: &str) -> bool {
        match self {
            PermissionSet::All => true,
            PermissionSet::Keys(keys) => keys.contains(key),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RolePermissions {
    roles: HashMap<String, PermissionSet>,
}

impl RolePermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role<I, S>(mut self, role: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.insert(role.into(), PermissionSet::from_keys(keys));
        self
    }

    pub fn role(&self, role: &str) -> Option<&PermissionSet> {
        self.roles.get(role)
    }

    pub fn contains_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }
}

impl PermissionService for RolePermissions {
    /// Unknown roles have no permissions.
    fn has_permission(&self, role: &str, key: &str) -> bool {
        self.roles.get(role).is_some_and(|set| set.allows(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RolePermissions {
        RolePermissions::new()
            .with_role("owner", [WILDCARD])
            .with_role("operator", [START_STOP])
            .with_role("viewer", Vec::<String>::new())
    }

    #[test]
    fn test_wildcard_grants_everything() {
        let permissions = table();
        assert_eq!(permissions.role("owner"), Some(&PermissionSet::All));
        assert!(permissions.has_permission("owner", DELETE));
        assert!(permissions.has_permission("owner", "billing.read"));
    }

    #[test]
    fn test_explicit_keys() {
        let permissions = table();
        assert!(permissions.has_permission("operator", START_STOP));
        assert!(!permissions.has_permission("operator", DELETE));
        assert!(!permissions.has_permission("viewer", START_STOP));
    }

    #[test]
    fn test_unknown_role_is_denied() {
        let permissions = table();
        assert!(!permissions.contains_role("intern"));
        assert!(!permissions.has_permission("intern", START_STOP));
    }
}
