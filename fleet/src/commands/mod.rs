//! Command dispatch and the shared page context.

use anyhow::{Context, Result};
use fleet_batch::{BatchAction, BatchSession, OrchestratorConfig};
use fleet_core::fleet_warning;
use fleet_provider::{Inventory, SimulatedCloud};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info_span};

use crate::cli::{Args, Command};

pub mod batch;
pub mod list;
pub mod targets;

/// Everything one command needs: the loaded page and where the inventory
/// lives so it can be written back after a batch.
pub struct PageContext {
    pub session: BatchSession,
    pub cloud: Arc<SimulatedCloud>,
    pub inventory_path: PathBuf,
}

impl PageContext {
    pub async fn open(args: &Args) -> Result<Self> {
        let config = OrchestratorConfig::load_or_default(args.config.as_deref())
            .context("Failed to load orchestrator config")?;

        let inventory_path = match &args.inventory {
            Some(path) => path.clone(),
            None => default_inventory_path()?,
        };
        let inventory = load_inventory(&inventory_path)?;
        debug!(
            "Loaded {} resources from {}",
            inventory.resources.len(),
            inventory_path.display()
        );

        let cloud = Arc::new(SimulatedCloud::new(inventory).with_latency(action_latency()));
        let mut session = BatchSession::from_config(
            &config,
            args.role.as_deref(),
            cloud.clone(),
            cloud.clone(),
        );

        if let Some(banner) = session.load().await {
            fleet_warning!("{}", banner.message);
        }

        Ok(Self {
            session,
            cloud,
            inventory_path,
        })
    }

    /// Write the simulated provider state back to the inventory file.
    pub async fn persist(&self) -> Result<()> {
        self.cloud
            .inventory()
            .await
            .save_to_path(&self.inventory_path)
            .with_context(|| format!("Failed to save {}", self.inventory_path.display()))
    }
}

pub async fn execute_command(args: Args) -> Result<()> {
    let mut page = PageContext::open(&args).await?;

    match &args.command {
        Command::List { selection } => {
            let span = info_span!("fleet_command", command = "list", role = %page.session.role());
            span.in_scope(|| list::handle_list(&mut page.session, selection))
        }
        Command::Start { batch } => batch::handle_batch(&mut page, BatchAction::Start, batch).await,
        Command::Stop { batch } => batch::handle_batch(&mut page, BatchAction::Stop, batch).await,
        Command::Delete { batch } => {
            batch::handle_batch(&mut page, BatchAction::Delete, batch).await
        }
    }
}

fn default_inventory_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".fleet").join("inventory.yaml"))
}

/// Missing inventories are seeded with the sample fleet.
fn load_inventory(path: &Path) -> Result<Inventory> {
    if !path.exists() {
        let inventory = Inventory::sample();
        inventory
            .save_to_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        return Ok(inventory);
    }

    Inventory::load_from_path(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Per-action delay of the simulated provider, `FLEET_SIM_LATENCY_MS`.
fn action_latency() -> Duration {
    std::env::var("FLEET_SIM_LATENCY_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::ZERO)
}
