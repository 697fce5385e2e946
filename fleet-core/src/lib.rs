//! Shared foundation for the fleet dashboard crates.
//!
//! Holds the error type every crate converts into, the resource model that
//! the batch orchestrator and providers exchange, and the terminal output
//! macros used by the CLI.

pub mod error;
pub mod output_macros;
pub mod resource;

pub use error::{FleetError, Result};
pub use resource::{LifecycleState, ResourceId, ResourceKind, ResourceRef, StateClass};
