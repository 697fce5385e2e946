//! Simulated cloud inventory behind the orchestrator's provider seams.
//!
//! [`SimulatedCloud`] implements both [`fleet_batch::ResourceActions`] and
//! [`fleet_batch::ResourceCollection`] over a YAML-seeded inventory. Each
//! resource keeps its state in its provider's own vocabulary and is translated
//! through [`ProviderKind`] whenever the orchestrator reads it.

pub mod inventory;
pub mod simulated;
pub mod vocabulary;

pub use inventory::{FailureKind, FailureSpec, Inventory, InventoryEntry};
pub use simulated::SimulatedCloud;
pub use vocabulary::ProviderKind;
