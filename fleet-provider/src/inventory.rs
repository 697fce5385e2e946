//! YAML inventory format.
//!
//! ```yaml
//! resources:
//!   - id: vm-web-01
//!     name: web-01
//!     provider: azure
//!     state: PowerState/running
//!     scope: rg-web
//!     fail:
//!       actions: [stop]
//!       kind: http
//!       status: 409
//!       message: quota exceeded
//! ```

use fleet_batch::{ActionError, ActionErrorKind, BatchAction};
use fleet_core::{ResourceKind, ResourceRef, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::vocabulary::ProviderKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub resources: Vec<InventoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub id: String,
    pub name: String,
    pub provider: ProviderKind,
    #[serde(default)]
    pub kind: ResourceKind,
    /// Raw state in the provider's vocabulary.
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<FailureSpec>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Http,
    Network,
    #[default]
    Unknown,
}

/// Injected failure for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSpec {
    /// Actions that fail; empty means every action.
    #[serde(default)]
    pub actions: Vec<BatchAction>,
    #[serde(default)]
    pub kind: FailureKind,
    #[serde(default)]
    pub status: Option<u16>,
    pub message: String,
}

impl FailureSpec {
    pub fn applies_to(&self, action: BatchAction) -> bool {
        self.actions.is_empty() || self.actions.contains(&action)
    }

    pub fn to_error(&self) -> ActionError {
        let kind = match self.kind {
            FailureKind::Http => ActionErrorKind::HttpError {
                status: self.status.unwrap_or(500),
            },
            FailureKind::Network => ActionErrorKind::NetworkError,
            FailureKind::Unknown => ActionErrorKind::Unknown,
        };
        ActionError::new(kind, self.message.clone())
    }
}

impl InventoryEntry {
    pub fn to_resource(&self) -> ResourceRef {
        let mut resource = ResourceRef::new(
            self.id.as_str(),
            self.name.clone(),
            self.provider.parse_state(&self.state),
        )
        .with_kind(self.kind)
        .with_provider(self.provider.label());
        resource.scope = self.scope.clone();
        resource
    }
}

impl Inventory {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(contents)?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml_ng::to_string(self)?)?;
        Ok(())
    }

    /// Small mixed fleet used when no inventory file is given.
    pub fn sample() -> Self {
        let entry = |id: &str,
                     provider: ProviderKind,
                     kind: ResourceKind,
                     state: &str,
                     scope: Option<&str>| InventoryEntry {
            id: id.to_string(),
            name: id.to_string(),
            provider,
            kind,
            state: state.to_string(),
            scope: scope.map(str::to_string),
            fail: None,
        };

        let mut resources = vec![
            entry(
                "web-01",
                ProviderKind::Azure,
                ResourceKind::VirtualMachine,
                "PowerState/running",
                Some("rg-web"),
            ),
            entry(
                "web-02",
                ProviderKind::Azure,
                ResourceKind::VirtualMachine,
                "PowerState/deallocated",
                Some("rg-web"),
            ),
            entry(
                "batch-worker",
                ProviderKind::Aws,
                ResourceKind::VirtualMachine,
                "running",
                Some("us-east-1"),
            ),
            entry(
                "reports-db",
                ProviderKind::Gcp,
                ResourceKind::Database,
                "TERMINATED",
                Some("analytics"),
            ),
            entry(
                "cache",
                ProviderKind::Docker,
                ResourceKind::AppService,
                "Up 3 hours",
                None,
            ),
        ];
        resources[2].fail = Some(FailureSpec {
            actions: vec![BatchAction::Stop],
            kind: FailureKind::Unknown,
            status: None,
            message: "quota exceeded".to_string(),
        });

        Self { resources }
    }
}
