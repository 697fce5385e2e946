use fleet_core::{FleetError, LifecycleState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which provider's state vocabulary a resource reports in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Azure,
    Aws,
    Gcp,
    Docker,
}

impl ProviderKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::Azure => "azure",
            ProviderKind::Aws => "aws",
            ProviderKind::Gcp => "gcp",
            ProviderKind::Docker => "docker",
        }
    }

    /// Translate a raw provider state string. Anything unrecognised becomes
    /// [`LifecycleState::Unknown`] and is never eligible for start or stop.
    pub fn parse_state(&self, raw: &str) -> LifecycleState {
        let normalized = raw.trim().to_lowercase();
        let state = match self {
            ProviderKind::Azure => parse_azure(&normalized),
            ProviderKind::Aws => parse_aws(&normalized),
            ProviderKind::Gcp => parse_gcp(&normalized),
            ProviderKind::Docker => parse_docker(&normalized),
        };
        state.unwrap_or_else(|| LifecycleState::Unknown(raw.trim().to_string()))
    }

    /// The string this provider reports for `state`.
    pub fn raw_for(&self, state: &LifecycleState) -> String {
        use LifecycleState::*;

        let raw = match (self, state) {
            (_, Unknown(raw)) => return raw.clone(),

            (ProviderKind::Azure, Running) => "PowerState/running",
            (ProviderKind::Azure, Stopped) => "PowerState/stopped",
            (ProviderKind::Azure, Deallocated) => "PowerState/deallocated",
            (ProviderKind::Azure, Starting) => "PowerState/starting",
            (ProviderKind::Azure, Stopping) => "PowerState/deallocating",
            (ProviderKind::Azure, Provisioning) => "Creating",
            (ProviderKind::Azure, Deleting) => "Deleting",
            (ProviderKind::Azure, Failed) => "Failed",

            (ProviderKind::Aws, Running) => "running",
            (ProviderKind::Aws, Stopped | Deallocated) => "stopped",
            (ProviderKind::Aws, Starting | Provisioning) => "pending",
            (ProviderKind::Aws, Stopping) => "stopping",
            (ProviderKind::Aws, Deleting) => "shutting-down",
            (ProviderKind::Aws, Failed) => "impaired",

            (ProviderKind::Gcp, Running) => "RUNNING",
            (ProviderKind::Gcp, Stopped | Deallocated) => "TERMINATED",
            (ProviderKind::Gcp, Starting) => "STAGING",
            (ProviderKind::Gcp, Stopping) => "STOPPING",
            (ProviderKind::Gcp, Provisioning) => "PROVISIONING",
            (ProviderKind::Gcp, Deleting) => "DELETING",
            (ProviderKind::Gcp, Failed) => "REPAIRING",

            (ProviderKind::Docker, Running) => "Up 1 second",
            (ProviderKind::Docker, Stopped | Deallocated) => "Exited (0)",
            (ProviderKind::Docker, Starting) => "restarting",
            (ProviderKind::Docker, Stopping) => "stopping",
            (ProviderKind::Docker, Provisioning) => "created",
            (ProviderKind::Docker, Deleting) => "removing",
            (ProviderKind::Docker, Failed) => "dead",
        };
        raw.to_string()
    }
}

fn parse_azure(state: &str) -> Option<LifecycleState> {
    let state = state.strip_prefix("powerstate/").unwrap_or(state);
    match state {
        "running" => Some(LifecycleState::Running),
        "stopped" => Some(LifecycleState::Stopped),
        "deallocated" => Some(LifecycleState::Deallocated),
        "starting" => Some(LifecycleState::Starting),
        "stopping" | "deallocating" => Some(LifecycleState::Stopping),
        "creating" | "updating" => Some(LifecycleState::Provisioning),
        "deleting" => Some(LifecycleState::Deleting),
        "failed" => Some(LifecycleState::Failed),
        _ => None,
    }
}

fn parse_aws(state: &str) -> Option<LifecycleState> {
    match state {
        "running" => Some(LifecycleState::Running),
        "stopped" => Some(LifecycleState::Stopped),
        "pending" => Some(LifecycleState::Starting),
        "stopping" => Some(LifecycleState::Stopping),
        "shutting-down" | "terminated" => Some(LifecycleState::Deleting),
        "impaired" => Some(LifecycleState::Failed),
        _ => None,
    }
}

fn parse_gcp(state: &str) -> Option<LifecycleState> {
    match state {
        "running" => Some(LifecycleState::Running),
        "terminated" | "stopped" | "suspended" => Some(LifecycleState::Stopped),
        "staging" => Some(LifecycleState::Starting),
        "stopping" | "suspending" => Some(LifecycleState::Stopping),
        "provisioning" => Some(LifecycleState::Provisioning),
        "deleting" => Some(LifecycleState::Deleting),
        "repairing" => Some(LifecycleState::Failed),
        _ => None,
    }
}

fn parse_docker(state: &str) -> Option<LifecycleState> {
    // `docker ps` reports "Up 3 minutes" or "Exited (0) 2 hours ago".
    if state.contains("paused") {
        return None;
    }
    if state == "running" || state.starts_with("up") {
        return Some(LifecycleState::Running);
    }
    if state.starts_with("exited") {
        return Some(LifecycleState::Stopped);
    }
    match state {
        "created" => Some(LifecycleState::Provisioning),
        "restarting" => Some(LifecycleState::Starting),
        "stopping" => Some(LifecycleState::Stopping),
        "removing" => Some(LifecycleState::Deleting),
        "dead" => Some(LifecycleState::Failed),
        _ => None,
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProviderKind {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "azure" => Ok(ProviderKind::Azure),
            "aws" => Ok(ProviderKind::Aws),
            "gcp" | "google" => Ok(ProviderKind::Gcp),
            "docker" => Ok(ProviderKind::Docker),
            other => Err(FleetError::Provider(format!("Unknown provider: {other}"))),
        }
    }
}
