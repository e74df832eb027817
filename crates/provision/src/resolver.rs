//! Resolver - turns policy into an ordered list of install actions
//!
//! Resolution is a pure function of the store and a platform id:
//!
//! 1. Start from the base policy
//! 2. Right-biased merge with the platform override (override keys win,
//!    new keys are added)
//! 3. Keep enabled packages
//! 4. Attach a download source where one exists for the platform
//! 5. Order by package name
//!
//! Output order never depends on map iteration order.

use crate::store::PolicyStore;
use crate::types::{InstallAction, PackagePolicy, ProvisionPlan};
use log::{debug, trace};

/// Computes install actions for a platform
#[derive(Debug, Clone)]
pub struct Resolver {
    store: PolicyStore,
}

impl Resolver {
    pub fn new(store: PolicyStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &PolicyStore {
        &self.store
    }

    /// Base policy with the platform override applied
    pub fn merged_policy(&self, platform: &str) -> PackagePolicy {
        let mut merged = self.store.base_policy().clone();
        let overrides = self.store.override_for(platform);

        if overrides.is_empty() {
            debug!("No override for platform '{platform}', using base policy");
        }

        for (name, enabled) in overrides {
            if let Some(previous) = merged.insert(name.clone(), *enabled)
                && previous != *enabled
            {
                trace!("{platform}: {name} overridden {previous} -> {enabled}");
            }
        }

        merged
    }

    /// Ordered install actions for `platform`
    pub fn resolve(&self, platform: &str) -> Vec<InstallAction> {
        // BTreeMap iteration is already name-ordered
        let actions: Vec<InstallAction> = self
            .merged_policy(platform)
            .into_iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(name, _)| self.action_for(name, platform))
            .collect();

        debug!("Resolved {} actions for '{platform}'", actions.len());
        actions
    }

    /// Full provisioning plan for `platform`
    pub fn plan(&self, platform: &str) -> ProvisionPlan {
        ProvisionPlan {
            platform: platform.to_string(),
            actions: self.resolve(platform),
            proxy: self.store.proxy_config().clone(),
            configure_powershell: self.store.configure_powershell(),
        }
    }

    fn action_for(&self, name: String, platform: &str) -> InstallAction {
        let source = self.store.source_for_platform(&name, platform);

        match source.and_then(|s| s.url.clone().map(|url| (s, url))) {
            Some((source, url)) => InstallAction::DownloadAndInstall {
                file_name: source.cache_file_name(&name),
                checksum: source.checksum.clone(),
                installer_flags: source.installer_flags.clone(),
                url,
                name,
            },
            None => InstallAction::PackageManagerInstall { name },
        }
    }
}
