//! Progress reporting for `apply`.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use provision::{ApplyResult, InstallAction, ProgressCallback};

use crate::ui;

/// Progress bar that also prints one line per finished action
pub struct ApplyProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl ApplyProgress {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    fn println(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }
}

impl ProgressCallback for ApplyProgress {
    fn on_start(&mut self, count: usize) {
        if self.quiet {
            return;
        }
        let bar = ProgressBar::new(count as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        self.bar = Some(bar);
    }

    fn on_action_start(&mut self, action: &InstallAction) {
        if let Some(bar) = &self.bar {
            bar.set_message(action.name().to_string());
        }
    }

    fn on_action_complete(&mut self, action: &InstallAction, result: &ApplyResult) {
        if !self.quiet {
            let symbol = ui::result_symbol(result);
            let line = match result {
                ApplyResult::Installed => format!("  {} {}", symbol.green(), action.name()),
                ApplyResult::AlreadySatisfied => format!(
                    "  {} {} {}",
                    symbol.dimmed(),
                    action.name(),
                    "(already installed)".dimmed()
                ),
                ApplyResult::Failed { error } => {
                    format!("  {} {}: {}", symbol.red(), action.name(), error.red())
                }
                ApplyResult::Skipped { reason } => format!(
                    "  {} {} {}",
                    symbol.yellow(),
                    action.name(),
                    format!("({reason})").dimmed()
                ),
            };
            self.println(line);
        }

        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
