//! Execution driver - runs resolved actions through an installer
//!
//! Actions run sequentially in resolver order. A failed action is recorded
//! and execution moves on; nothing is retried here.

use crate::context::{AutoConfirm, ConfirmCallback, Installer, NoProgress, ProgressCallback};
use crate::error::{Error, Result};
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary, InstallAction};
use log::{debug, info, warn};

/// Execute `actions` with the given options and callbacks
///
/// # Arguments
/// * `actions` - Ordered actions, typically from [`Resolver::resolve`](crate::Resolver::resolve)
/// * `opts` - Execution options (dry_run, verbose)
/// * `installer` - Collaborator that performs each action
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback, asked once before any change
///
/// # Returns
/// Summary of execution results
pub fn execute<I, P, C>(
    actions: &[InstallAction],
    opts: &ExecuteOptions,
    installer: &I,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    I: Installer + ?Sized,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let mut summary = ExecuteSummary::default();

    if actions.is_empty() {
        return Ok(summary);
    }

    if opts.dry_run {
        for action in actions {
            summary.add_result(
                action.name(),
                &ApplyResult::Skipped {
                    reason: "dry run".into(),
                },
            );
        }
        return Ok(summary);
    }

    let prompt = format!("Apply {} install actions?", actions.len());
    if !confirm
        .confirm(&prompt)
        .map_err(|e| Error::Confirmation(e.to_string()))?
    {
        info!("Execution declined, skipping {} actions", actions.len());
        for action in actions {
            summary.add_result(
                action.name(),
                &ApplyResult::Skipped {
                    reason: "declined".into(),
                },
            );
        }
        return Ok(summary);
    }

    progress.on_start(actions.len());

    for action in actions {
        progress.on_action_start(action);
        let result = apply_action(installer, action, opts.verbose);
        progress.on_action_complete(action, &result);
        summary.add_result(action.name(), &result);
    }

    progress.on_finish();

    Ok(summary)
}

/// Apply a single action, folding collaborator errors into the result
fn apply_action<I: Installer + ?Sized>(
    installer: &I,
    action: &InstallAction,
    verbose: bool,
) -> ApplyResult {
    match installer.is_satisfied(action) {
        Ok(true) => {
            debug!("{} already satisfied", action.name());
            return ApplyResult::AlreadySatisfied;
        }
        Ok(false) => {}
        Err(e) => debug!("Could not check {}: {e}", action.name()),
    }

    if verbose {
        info!("{}", action.description());
    }

    match installer.perform(action) {
        Ok(result) => result,
        Err(e) => {
            warn!("{} failed: {e}", action.name());
            ApplyResult::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple<I: Installer + ?Sized>(
    actions: &[InstallAction],
    opts: &ExecuteOptions,
    installer: &I,
) -> Result<ExecuteSummary> {
    execute(actions, opts, installer, &mut NoProgress, &mut AutoConfirm)
}
