use fleet_core::FleetError;
use thiserror::Error;

use crate::action::BatchAction;

pub type Result<T> = std::result::Result<T, BatchError>;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Permission denied: role '{role}' lacks '{key}'")]
    PermissionDenied { role: String, key: String },

    #[error("No selected resource is eligible for {0}")]
    NothingEligible(BatchAction),

    #[error("Confirmation required before {action} of {count} resource(s)")]
    ConfirmationRequired { action: BatchAction, count: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Fleet(#[from] FleetError),
}

impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        BatchError::Fleet(err.into())
    }
}

impl From<serde_yaml_ng::Error> for BatchError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        BatchError::Fleet(err.into())
    }
}
