use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{BatchError, Result};
use crate::permissions::{RolePermissions, DELETE, START_STOP, WILDCARD};

/// Orchestrator settings: who may do what, and how a session shuts down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Role name to the permission keys it holds.
    #[serde(default = "default_roles")]
    pub roles: IndexMap<String, Vec<String>>,

    #[serde(default = "default_role")]
    pub default_role: String,

    /// Cancel an in-flight batch when its session is torn down.
    #[serde(default = "default_cancel_on_teardown")]
    pub cancel_on_teardown: bool,
}

fn default_roles() -> IndexMap<String, Vec<String>> {
    let mut roles = IndexMap::new();
    roles.insert("admin".to_string(), vec![WILDCARD.to_string()]);
    roles.insert("operator".to_string(), vec![START_STOP.to_string()]);
    roles.insert("viewer".to_string(), Vec::new());
    roles
}

fn default_role() -> String {
    std::env::var("FLEET_ROLE").unwrap_or_else(|_| "viewer".to_string())
}

fn default_cancel_on_teardown() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            roles: default_roles(),
            default_role: default_role(),
            cancel_on_teardown: default_cancel_on_teardown(),
        }
    }
}

impl OrchestratorConfig {
    /// `$FLEET_CONFIG`, falling back to `~/.fleet/config.yaml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("FLEET_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        dirs::home_dir()
            .map(|home| home.join(".fleet").join("config.yaml"))
            .ok_or_else(|| BatchError::Config("Could not determine home directory".to_string()))
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;
        std::fs::write(path, yaml)?;

        Ok(())
    }

    /// Load `path` if it exists, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if path.exists() {
            debug!("Loading orchestrator config from {}", path.display());
            Self::load_from_path(&path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        const KNOWN: [&str; 3] = [START_STOP, DELETE, WILDCARD];
        for (role, keys) in &self.roles {
            if let Some(key) = keys.iter().find(|key| !KNOWN.contains(&key.as_str())) {
                return Err(BatchError::Config(format!(
                    "Role '{role}' lists unknown permission key '{key}'"
                )));
            }
        }
        Ok(())
    }

    pub fn permissions(&self) -> RolePermissions {
        self.roles
            .iter()
            .fold(RolePermissions::new(), |table, (role, keys)| {
                table.with_role(role.clone(), keys.iter().cloned())
            })
    }

    /// An explicit role wins over the configured default.
    pub fn resolve_role(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_string)
            .unwrap_or_else(|| self.default_role.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::PermissionService;
    use tempfile::TempDir;

    #[test]
    fn test_default_roles() {
        let config = OrchestratorConfig {
            default_role: "viewer".to_string(),
            ..Default::default()
        };
        let permissions = config.permissions();

        assert!(permissions.has_permission("admin", DELETE));
        assert!(permissions.has_permission("operator", START_STOP));
        assert!(!permissions.has_permission("operator", DELETE));
        assert!(!permissions.has_permission("viewer", START_STOP));
        assert_eq!(config.resolve_role(None), "viewer");
        assert_eq!(config.resolve_role(Some("admin")), "admin");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");

        let mut config = OrchestratorConfig::default();
        config
            .roles
            .insert("auditor".to_string(), vec![DELETE.to_string()]);
        config.cancel_on_teardown = false;
        config.save_to_path(&path).unwrap();

        let loaded = OrchestratorConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.roles.keys().last().map(String::as_str), Some("auditor"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "default_role: operator\n").unwrap();

        let config = OrchestratorConfig::load_from_path(&path).unwrap();
        assert_eq!(config.default_role, "operator");
        assert!(config.cancel_on_teardown);
        assert_eq!(config.roles.len(), 3);
    }

    #[test]
    fn test_unknown_permission_key_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "roles:\n  ops:\n    - resources.reboot\n").unwrap();

        let err = OrchestratorConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, BatchError::Config(_)));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.yaml");

        let config = OrchestratorConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.roles.len(), 3);
    }
}
