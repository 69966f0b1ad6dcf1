// UI layer: terminal feedback while the tool talks to the server. All of
// it goes to stderr so stdout stays clean for plan JSON and previews.

use crate::plan::Plan;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Spinner shown while a generator reads remote state.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Bar counting executed requests during apply or revert.
pub fn request_bar(message: &str) -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(message.to_owned());
    bar
}

/// Print a plan to stdout, or save it when an output path is given.
pub fn emit_plan(plan: &Plan, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            plan.save(path)?;
            eprintln!("Wrote plan with {} operations to {}", plan.len(), path.display());
            Ok(())
        }
        None => plan.to_writer(std::io::stdout().lock()),
    }
}
