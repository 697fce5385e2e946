use clap::Parser;
use tracing::info;

use fleet_core::fleet_error_with_details;

mod cli;
mod commands;
mod progress;

use cli::Args;
use commands::execute_command;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Tests expect clean output, so logging stays off in test mode.
    let _log_guard = if std::env::var("FLEET_TEST_MODE").is_err() {
        let mut settings = fleet_logging::LogSettings::from_env();
        if args.debug {
            settings.level = "debug".to_string();
        }
        fleet_logging::init_with(&settings)
    } else {
        None
    };

    if args.debug {
        info!("Starting fleet command: {:?}", args.command);
    }

    if let Err(e) = execute_command(args).await {
        fleet_error_with_details!(e, e.chain().skip(1));
        std::process::exit(1);
    }
}
