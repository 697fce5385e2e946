//! Start, stop and delete over the current selection.

use anyhow::{bail, Context, Result};
use dialoguer::Confirm;
use fleet_batch::{BatchAction, Confirmation, DialogState};
use fleet_core::{fleet_info, fleet_println, fleet_success, fleet_warning};
use std::io::IsTerminal;
use tracing::{debug, info_span, warn, Instrument};

use super::list::render_action_bar;
use super::targets::apply_selection;
use super::PageContext;
use crate::cli::BatchArgs;
use crate::progress::spawn_progress_bar;

pub async fn handle_batch(
    page: &mut PageContext,
    action: BatchAction,
    args: &BatchArgs,
) -> Result<()> {
    let span = info_span!(
        "fleet_command",
        command = %action,
        role = %page.session.role()
    );
    run_batch(page, action, args).instrument(span).await
}

async fn run_batch(page: &mut PageContext, action: BatchAction, args: &BatchArgs) -> Result<()> {
    let session = &mut page.session;
    apply_selection(session, &args.selection)?;

    let Some(bar) = session.action_bar() else {
        bail!("No resources selected; use --select, --pattern or --all");
    };
    fleet_println!("{}", render_action_bar(&bar));

    let mut prepared = session.prepare(action)?;
    let job = prepared.job().clone();

    if args.dry_run {
        fleet_println!("Dry run: Would {} {} resource(s)", action, job.total());
        for target in job.targets() {
            fleet_println!("  - {} ({}, {})", target.name, target.provider, target.state);
        }
        return Ok(());
    }

    if let Some(confirmation) = prepared.confirmation() {
        if !confirmed(confirmation, args.yes)? {
            fleet_info!("{} cancelled", action);
            return Ok(());
        }
        prepared.confirm();
    }

    let progress = spawn_progress_bar(prepared.subscribe(), job.total(), action.to_string());

    // Ctrl-C stops issuing actions; whatever is in flight settles first.
    let teardown = session.teardown_handle();
    let cancel = prepared.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining targets");
            cancel.cancel();
            teardown.teardown();
        }
    });

    let completed = session.execute(prepared).await?;
    interrupt.abort();
    if let Err(e) = progress.await {
        debug!("Progress bar task ended abnormally: {}", e);
    }

    let report = &completed.report;
    if args.json {
        fleet_println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        let lines = report.render_lines();
        if report.is_success() {
            fleet_success!("{}", lines.join("\n"));
        } else {
            for line in &lines {
                fleet_println!("{}", line);
            }
        }
    }

    match report.dialog() {
        DialogState::Failures(failures) => {
            fleet_warning!(
                "{} resource(s) failed; fix the cause and run the batch again",
                failures.len()
            );
        }
        DialogState::Cancelled { skipped, .. } => {
            fleet_warning!(
                "Batch cancelled; {} resource(s) were not attempted",
                skipped.len()
            );
        }
        DialogState::Dismissed => {}
    }
    if let Some(banner) = page.session.banner() {
        fleet_warning!("{}", banner.message);
    }

    page.persist().await
}

fn confirmed(confirmation: &Confirmation, assume_yes: bool) -> Result<bool> {
    fleet_println!("The following resources will be deleted:");
    for name in &confirmation.names {
        fleet_println!("  - {}", name);
    }

    if assume_yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        bail!("Refusing to {} without confirmation; pass --yes", confirmation.action);
    }

    Confirm::new()
        .with_prompt(confirmation.prompt())
        .default(false)
        .interact()
        .context("Failed to prompt for confirmation")
}
