use async_trait::async_trait;
use fleet_core::ResourceRef;
use std::sync::Arc;
use tracing::{error, info};

use crate::selection::SelectionSet;

/// Backing collection of the resource page.
#[async_trait]
pub trait ResourceCollection: Send + Sync {
    /// Invalidate any cached view and read the collection again, in display
    /// order.
    async fn refetch(&self) -> fleet_core::Result<Vec<ResourceRef>>;
}

/// Page-level error banner, shown independently of any batch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBanner {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed(Vec<ResourceRef>),
    Failed(PageBanner),
}

/// Resets the page once a batch has returned, whatever its outcome.
#[derive(Clone)]
pub struct RefreshCoordinator {
    collection: Arc<dyn ResourceCollection>,
}

impl RefreshCoordinator {
    pub fn new(collection: Arc<dyn ResourceCollection>) -> Self {
        Self { collection }
    }

    /// Clear the selection, then refetch exactly once.
    pub async fn after_batch(&self, selection: &mut SelectionSet) -> RefreshOutcome {
        selection.clear();
        self.load().await
    }

    /// Fetch the collection without touching any selection.
    pub async fn load(&self) -> RefreshOutcome {
        match self.collection.refetch().await {
            Ok(resources) => {
                info!("Refreshed resource list ({} resources)", resources.len());
                RefreshOutcome::Refreshed(resources)
            }
            Err(e) => {
                error!("Failed to refresh resources: {}", e);
                RefreshOutcome::Failed(PageBanner {
                    message: format!("Could not refresh resources: {e}"),
                })
            }
        }
    }
}
