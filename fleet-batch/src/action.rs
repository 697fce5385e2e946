use async_trait::async_trait;
use fleet_core::{FleetError, ResourceRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::permissions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    Start,
    Stop,
    Delete,
}

impl BatchAction {
    /// Action bar order.
    pub const ALL: [BatchAction; 3] = [BatchAction::Start, BatchAction::Stop, BatchAction::Delete];

    pub fn label(&self) -> &'static str {
        match self {
            BatchAction::Start => "start",
            BatchAction::Stop => "stop",
            BatchAction::Delete => "delete",
        }
    }

    /// Capitalized label for headings and controls.
    pub fn title(&self) -> &'static str {
        match self {
            BatchAction::Start => "Start",
            BatchAction::Stop => "Stop",
            BatchAction::Delete => "Delete",
        }
    }

    pub fn permission_key(&self) -> &'static str {
        match self {
            BatchAction::Start | BatchAction::Stop => permissions::START_STOP,
            BatchAction::Delete => permissions::DELETE,
        }
    }

    /// Destructive actions need an explicit confirmation before they run.
    pub fn is_destructive(&self) -> bool {
        matches!(self, BatchAction::Delete)
    }
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BatchAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(BatchAction::Start),
            "stop" => Ok(BatchAction::Stop),
            "delete" | "destroy" => Ok(BatchAction::Delete),
            other => Err(format!("unknown batch action: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionErrorKind {
    HttpError { status: u16 },
    NetworkError,
    Unknown,
}

/// Failure of a single per-resource action, normalized at the provider
/// boundary so everything downstream sees one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    pub kind: ActionErrorKind,
    pub message: String,
}

impl ActionError {
    pub fn new(kind: ActionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::HttpError { status }, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::NetworkError, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::Unknown, message)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ActionErrorKind::HttpError { status: 404 })
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ActionError {}

impl From<FleetError> for ActionError {
    fn from(err: FleetError) -> Self {
        match err {
            FleetError::NotFound(id) => ActionError::http(404, format!("Resource not found: {id}")),
            FleetError::Io(e) => ActionError::network(e.to_string()),
            other => ActionError::unknown(other.to_string()),
        }
    }
}

/// Per-resource lifecycle capability offered by a provider.
///
/// The target carries both its identifier and its scope (resource group,
/// project...), which is everything a provider needs to address it.
#[async_trait]
pub trait ResourceActions: Send + Sync {
    async fn start(&self, target: &ResourceRef) -> Result<(), ActionError>;

    async fn stop(&self, target: &ResourceRef) -> Result<(), ActionError>;

    async fn delete(&self, target: &ResourceRef) -> Result<(), ActionError>;

    async fn apply(&self, action: BatchAction, target: &ResourceRef) -> Result<(), ActionError> {
        match action {
            BatchAction::Start => self.start(target).await,
            BatchAction::Stop => self.stop(target).await,
            BatchAction::Delete => self.delete(target).await,
        }
    }
}
