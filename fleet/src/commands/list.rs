use anyhow::Result;
use fleet_batch::{ActionBar, BatchSession, TriState};
use fleet_core::fleet_println;

use super::targets::apply_selection;
use crate::cli::SelectionArgs;

pub fn handle_list(session: &mut BatchSession, selection: &SelectionArgs) -> Result<()> {
    apply_selection(session, selection)?;

    if session.displayed().is_empty() {
        fleet_println!("No resources found");
        return Ok(());
    }

    render_table(session);
    if let Some(bar) = session.action_bar() {
        fleet_println!();
        fleet_println!("{}", render_action_bar(&bar));
    }
    Ok(())
}

fn checkbox(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

fn render_table(session: &BatchSession) {
    let header = match session.header_state() {
        TriState::None => "[ ]",
        TriState::Some => "[-]",
        TriState::All => "[x]",
    };

    fleet_println!(
        "{:<4} {:<20} {:<16} {:<12} {:<8} {:<12}",
        header,
        "NAME",
        "STATE",
        "KIND",
        "PROVIDER",
        "SCOPE"
    );
    for resource in session.displayed() {
        fleet_println!(
            "{:<4} {:<20} {:<16} {:<12} {:<8} {:<12}",
            checkbox(session.selection().is_selected(&resource.id)),
            resource.name,
            resource.state.to_string(),
            resource.kind.to_string(),
            resource.provider,
            resource.scope.as_deref().unwrap_or("-")
        );
    }
}

pub fn render_action_bar(bar: &ActionBar) -> String {
    let controls: Vec<String> = bar
        .controls()
        .iter()
        .map(|control| {
            if control.enabled {
                format!("[{}]", control.label())
            } else {
                format!("({})", control.label())
            }
        })
        .collect();

    format!("{} selected  {}", bar.selected_count(), controls.join(" "))
}
