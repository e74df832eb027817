//! Collaborator and callback traits
//!
//! These traits let the execution driver run without depending on a
//! specific package manager, downloader, or UI.

use crate::types::{ApplyResult, InstallAction};

/// Error type returned by installer collaborators
pub type InstallerError = Box<dyn std::error::Error + Send + Sync>;

/// Performs install actions on the host
///
/// Implementations are expected to be idempotent: installing something that
/// is already present should report [`ApplyResult::AlreadySatisfied`].
pub trait Installer {
    /// Install `name` through the platform package manager
    fn install_package(&self, name: &str) -> Result<ApplyResult, InstallerError>;

    /// Download `url` into the cache as `file_name`, verify `checksum` if
    /// given, then run it with `flags`
    fn download_and_install(
        &self,
        name: &str,
        url: &str,
        checksum: Option<&str>,
        flags: &str,
        file_name: &str,
    ) -> Result<ApplyResult, InstallerError>;

    /// Whether the action is already satisfied on this host
    ///
    /// The default never short-circuits.
    fn is_satisfied(&self, _action: &InstallAction) -> Result<bool, InstallerError> {
        Ok(false)
    }

    /// Dispatch an action to the matching method
    fn perform(&self, action: &InstallAction) -> Result<ApplyResult, InstallerError> {
        match action {
            InstallAction::PackageManagerInstall { name } => self.install_package(name),
            InstallAction::DownloadAndInstall {
                name,
                url,
                checksum,
                installer_flags,
                file_name,
            } => self.download_and_install(
                name,
                url,
                checksum.as_deref(),
                installer_flags,
                file_name,
            ),
        }
    }
}

/// Progress callback for execution operations
pub trait ProgressCallback {
    /// Called once before the first action
    fn on_start(&mut self, count: usize);

    /// Called when starting a single action
    fn on_action_start(&mut self, action: &InstallAction);

    /// Called when an action completes
    fn on_action_complete(&mut self, action: &InstallAction, result: &ApplyResult);

    /// Called after the last action
    fn on_finish(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool, InstallerError>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&mut self, _count: usize) {}
    fn on_action_start(&mut self, _action: &InstallAction) {}
    fn on_action_complete(&mut self, _action: &InstallAction, _result: &ApplyResult) {}
    fn on_finish(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool, InstallerError> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool, InstallerError> {
        Ok(false)
    }
}
