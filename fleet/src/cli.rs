use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fleet")]
#[command(about = "Batch start, stop and delete across a resource fleet")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the orchestrator configuration file
    #[arg(short, long, global = true, env = "FLEET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the resource inventory (YAML)
    #[arg(short, long, global = true, env = "FLEET_INVENTORY")]
    pub inventory: Option<PathBuf>,

    /// Role used for permission checks (defaults to the configured role)
    #[arg(short, long, global = true, env = "FLEET_ROLE")]
    pub role: Option<String>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List resources in display order with the current selection
    List {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Start every selected resource that is stopped or deallocated
    Start {
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Stop every selected resource that is running
    Stop {
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Delete every selected resource
    #[command(alias = "destroy")]
    Delete {
        #[command(flatten)]
        batch: BatchArgs,
    },
}

/// Which rows are displayed and which are marked.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct SelectionArgs {
    /// Only display resources whose name matches (supports `*` wildcards)
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Toggle these resources (ids or names, comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Header checkbox: select every displayed resource
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Debug, Clone, Default, ClapArgs)]
pub struct BatchArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Answer yes to the delete confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Show the targets without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}
