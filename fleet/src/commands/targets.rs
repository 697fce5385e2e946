//! Turning command line flags into page filtering and selection.

use anyhow::{bail, Result};
use fleet_batch::BatchSession;
use tracing::debug;

use crate::cli::SelectionArgs;

/// Apply the display filter, then the header toggle, then individual toggles.
pub fn apply_selection(session: &mut BatchSession, args: &SelectionArgs) -> Result<()> {
    if let Some(pattern) = &args.pattern {
        let owned = pattern.clone();
        session.set_filter(move |resource| match_pattern(&resource.name, &owned));
        debug!(
            "Pattern '{}' matched {} resource(s)",
            pattern,
            session.displayed().len()
        );
    }

    if args.all {
        session.select_all_displayed();
    }

    // Ids and names resolve against the full list, so a filtered-out
    // resource can still be marked.
    for wanted in &args.select {
        let found = session
            .resources()
            .iter()
            .find(|resource| resource.id.as_str() == wanted || resource.name == *wanted)
            .map(|resource| resource.id.clone());
        match found {
            Some(id) => session.toggle(&id),
            None => bail!("No resource named '{}'", wanted),
        }
    }

    Ok(())
}

pub fn match_pattern(name: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match (pattern.strip_prefix('*'), pattern.strip_suffix('*')) {
        (Some(rest), Some(_)) if !rest.is_empty() => name.contains(&rest[..rest.len() - 1]),
        (Some(suffix), None) => name.ends_with(suffix),
        (None, Some(prefix)) => name.starts_with(prefix),
        _ => name == pattern,
    }
}
