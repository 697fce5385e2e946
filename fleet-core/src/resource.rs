//! Resource model shared by the orchestrator and the providers.
//!
//! Providers report lifecycle states in their own vocabulary; by the time a
//! resource reaches the orchestrator it carries a [`LifecycleState`], and every
//! state folds into one of three [`StateClass`]es for eligibility purposes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque resource identifier as issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[default]
    VirtualMachine,
    Database,
    StorageAccount,
    Function,
    AppService,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::VirtualMachine => "vm",
            ResourceKind::Database => "database",
            ResourceKind::StorageAccount => "storage",
            ResourceKind::Function => "function",
            ResourceKind::AppService => "app-service",
        };
        f.write_str(label)
    }
}

/// Normalized lifecycle state of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Running,
    Stopped,
    Deallocated,
    Starting,
    Stopping,
    Provisioning,
    Deleting,
    Failed,
    /// A provider state string with no known mapping.
    Unknown(String),
}

impl LifecycleState {
    pub fn class(&self) -> StateClass {
        match self {
            LifecycleState::Stopped | LifecycleState::Deallocated => StateClass::Startable,
            LifecycleState::Running => StateClass::Stoppable,
            _ => StateClass::Neither,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Running => f.write_str("running"),
            LifecycleState::Stopped => f.write_str("stopped"),
            LifecycleState::Deallocated => f.write_str("deallocated"),
            LifecycleState::Starting => f.write_str("starting"),
            LifecycleState::Stopping => f.write_str("stopping"),
            LifecycleState::Provisioning => f.write_str("provisioning"),
            LifecycleState::Deleting => f.write_str("deleting"),
            LifecycleState::Failed => f.write_str("failed"),
            LifecycleState::Unknown(raw) => write!(f, "unknown ({raw})"),
        }
    }
}

/// Eligibility bucket every lifecycle state falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Startable,
    Stoppable,
    Neither,
}

/// A displayed resource as the dashboard sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: ResourceId,
    pub name: String,
    pub state: LifecycleState,
    #[serde(default)]
    pub kind: ResourceKind,
    #[serde(default)]
    pub provider: String,
    /// Parent grouping the provider needs to address the resource
    /// (resource group, project, region...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl ResourceRef {
    pub fn new(id: impl Into<ResourceId>, name: impl Into<String>, state: LifecycleState) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state,
            kind: ResourceKind::default(),
            provider: String::new(),
            scope: None,
        }
    }

    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn class(&self) -> StateClass {
        self.state.class()
    }
}
