use async_trait::async_trait;
use fleet_batch::{ActionError, BatchAction, ResourceActions, ResourceCollection};
use fleet_core::{FleetError, LifecycleState, ResourceRef, StateClass};
use std::path::Path;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::inventory::{Inventory, InventoryEntry};
use crate::vocabulary::ProviderKind;

/// In-memory cloud that answers like a provider API would.
pub struct SimulatedCloud {
    entries: RwLock<Vec<InventoryEntry>>,
    latency: Duration,
}

impl SimulatedCloud {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            entries: RwLock::new(inventory.resources),
            latency: Duration::ZERO,
        }
    }

    pub fn load_from_path(path: &Path) -> fleet_core::Result<Self> {
        Ok(Self::new(Inventory::load_from_path(path)?))
    }

    /// Delay every action call, so progress is observable.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Current inventory, raw states included.
    pub async fn inventory(&self) -> Inventory {
        Inventory {
            resources: self.entries.read().await.clone(),
        }
    }

    pub async fn resources(&self) -> Vec<ResourceRef> {
        self.entries
            .read()
            .await
            .iter()
            .map(InventoryEntry::to_resource)
            .collect()
    }

    async fn transition(&self, action: BatchAction, target: &ResourceRef) -> Result<(), ActionError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut entries = self.entries.write().await;
        let index = entries
            .iter()
            .position(|entry| entry.id == target.id.as_str())
            .ok_or_else(|| FleetError::NotFound(target.id.to_string()))?;

        if let Some(fail) = entries[index].fail.as_ref().filter(|f| f.applies_to(action)) {
            return Err(fail.to_error());
        }

        let (required, next) = match action {
            BatchAction::Start => (StateClass::Startable, LifecycleState::Running),
            BatchAction::Stop => (
                StateClass::Stoppable,
                stopped_state(entries[index].provider),
            ),
            BatchAction::Delete => {
                let removed = entries.remove(index);
                info!(resource_id = %removed.id, "Deleted {}", removed.name);
                return Ok(());
            }
        };

        let entry = &mut entries[index];
        let current = entry.provider.parse_state(&entry.state);
        require(&current, required, action, &entry.name)?;

        debug!(resource_id = %entry.id, "{} {} -> {}", entry.name, current, next);
        entry.state = entry.provider.raw_for(&next);
        Ok(())
    }
}

/// Azure stops by deallocating; everyone else just stops.
fn stopped_state(provider: ProviderKind) -> LifecycleState {
    match provider {
        ProviderKind::Azure => LifecycleState::Deallocated,
        _ => LifecycleState::Stopped,
    }
}

fn require(
    current: &LifecycleState,
    class: StateClass,
    action: BatchAction,
    name: &str,
) -> Result<(), ActionError> {
    if current.class() == class {
        Ok(())
    } else {
        Err(ActionError::http(
            409,
            format!("Cannot {action} {name} while it is {current}"),
        ))
    }
}

#[async_trait]
impl ResourceActions for SimulatedCloud {
    async fn start(&self, target: &ResourceRef) -> Result<(), ActionError> {
        self.transition(BatchAction::Start, target).await
    }

    async fn stop(&self, target: &ResourceRef) -> Result<(), ActionError> {
        self.transition(BatchAction::Stop, target).await
    }

    async fn delete(&self, target: &ResourceRef) -> Result<(), ActionError> {
        self.transition(BatchAction::Delete, target).await
    }
}

#[async_trait]
impl ResourceCollection for SimulatedCloud {
    async fn refetch(&self) -> fleet_core::Result<Vec<ResourceRef>> {
        Ok(self.resources().await)
    }
}
