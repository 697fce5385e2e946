//! Terminal progress indicator bound to a batch's progress channel.

use fleet_batch::JobState;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Draw `{done}/{total}` until the batch finishes or its executor goes away.
pub fn spawn_progress_bar(
    mut states: watch::Receiver<JobState>,
    total: usize,
    label: String,
) -> JoinHandle<()> {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar.set_message(label);

    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            if let Some(progress) = state.progress() {
                bar.set_position(progress.done as u64);
            }
            if state.is_finished() {
                break;
            }
        }
        bar.finish_and_clear();
    })
}
