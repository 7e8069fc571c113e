//! Activity spinner for the fetch and AI steps

use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Start a spinner on stderr; hidden when stderr is not a terminal
pub fn start(message: impl Into<String>) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    spinner.enable_steady_tick(Duration::from_millis(90));
    spinner.set_message(message.into());
    spinner
}

/// Await `future` behind a spinner, clearing it afterwards
pub async fn spin<F: Future>(message: impl Into<String>, future: F) -> F::Output {
    let spinner = start(message);
    let output = future.await;
    spinner.finish_and_clear();
    output
}
