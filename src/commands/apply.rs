use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use provision::{ConfirmCallback, ExecuteOptions, ExecuteSummary, InstallerError, Resolver};

use crate::Context;
use crate::config;
use crate::installer::SystemInstaller;
use crate::progress::ApplyProgress;
use crate::ui;

use super::plan::print_plan;

/// Prompts on the terminal unless `--yes` was given
struct TerminalConfirm {
    yes: bool,
}

impl ConfirmCallback for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> std::result::Result<bool, InstallerError> {
        if self.yes {
            return Ok(true);
        }

        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}

pub fn run(ctx: &Context, platform: Option<&str>, dry_run: bool, yes: bool) -> Result<()> {
    let (store, source) = config::load_store(ctx)?;
    let platform = config::target_platform(platform);
    let plan = Resolver::new(store).plan(&platform);

    ui::header(&format!("Applying policy for {platform}"));
    ui::kv("Policy", &source.to_string());
    print_plan(&plan, ctx.quiet);

    if plan.configure_powershell && platform == provision::platform::WINDOWS {
        log::warn!("PowerShell configuration is requested but devboot does not perform it");
    }

    if plan.actions.is_empty() {
        return Ok(());
    }

    let installer = SystemInstaller::new(&platform, config::cache_dir()?, plan.proxy.clone())
        .context("Could not set up installer")?;

    let opts = ExecuteOptions {
        dry_run,
        verbose: ctx.verbose > 0,
    };

    println!();
    let summary = provision::execute(
        &plan.actions,
        &opts,
        &installer,
        &mut ApplyProgress::new(ctx.quiet),
        &mut TerminalConfirm { yes },
    )?;

    if dry_run {
        println!();
        println!("  {} Dry run - nothing installed", "ℹ".blue());
        return Ok(());
    }

    print_summary(&summary);

    if summary.is_success() {
        Ok(())
    } else {
        anyhow::bail!("{} of {} actions failed", summary.failed, summary.total())
    }
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Workstation provisioned", "✓".green().bold());
    } else {
        println!("  {} Provisioned with errors", "⚠".yellow().bold());
    }

    if summary.installed > 0 {
        println!("    • {} installed", summary.installed);
    }
    if summary.satisfied > 0 {
        println!("    • {} already installed", summary.satisfied);
    }
    if summary.skipped > 0 {
        println!("    • {} skipped", summary.skipped);
    }
    for (name, error) in &summary.failures {
        println!("    • {} {}: {}", "failed".red(), name, error);
    }
}
