//! Policy store - the declarative desired-state tree
//!
//! A [`PolicyConfig`] is the raw document; a [`PolicyStore`] is a validated,
//! immutable view over it. Validation happens once, at construction, so
//! nothing downstream has to deal with half-valid data.

use crate::error::{Error, Result};
use crate::types::{PackagePolicy, ProxyConfig, SourceDescriptor};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Built-in policy used when no document is supplied
pub const DEFAULT_POLICY: &str = include_str!("default_policy.toml");

static EMPTY_POLICY: PackagePolicy = BTreeMap::new();

// ============================================================================
// Document schema
// ============================================================================

/// The policy document as written on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Base package flags, shared by every platform
    #[serde(default)]
    pub packages: PackagePolicy,

    /// Direct-download sources shared by every platform
    #[serde(default)]
    pub sources: BTreeMap<String, SourceDescriptor>,

    /// Per-platform deltas keyed by platform family
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformPolicy>,

    /// PowerShell settings
    #[serde(default)]
    pub powershell: PowerShellConfig,

    /// Proxy settings; unset fields fall back to the environment
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Platform-specific delta applied over the base policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPolicy {
    #[serde(default)]
    pub packages: PackagePolicy,

    /// Sources that only apply on this platform
    #[serde(default)]
    pub sources: BTreeMap<String, SourceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerShellConfig {
    /// Whether to manage PowerShell settings at all
    #[serde(default = "default_true")]
    pub configure: bool,
}

impl Default for PowerShellConfig {
    fn default() -> Self {
        Self { configure: true }
    }
}

fn default_true() -> bool {
    true
}

impl PolicyConfig {
    /// Parse a TOML policy document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a policy document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded policy document from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// The built-in policy
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_POLICY)
    }
}

// ============================================================================
// Store
// ============================================================================

/// Validated, read-only access to the desired state
#[derive(Debug, Clone)]
pub struct PolicyStore {
    config: PolicyConfig,
    proxy: ProxyConfig,
}

impl PolicyStore {
    /// Validate `config` and build a store
    ///
    /// `env_proxy` is the caller's snapshot of the proxy environment; values
    /// set in the document take precedence over it.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MalformedSourceDescriptor`] if any source has a
    /// checksum but no url, with [`Error::UnsafeFileName`] if a `file_name`
    /// is not a bare file name, and with [`Error::InvalidPackageName`] for
    /// empty package keys.
    pub fn new(config: PolicyConfig, env_proxy: ProxyConfig) -> Result<Self> {
        validate_packages(&config.packages, None)?;
        validate_sources(&config.sources, None)?;

        for (platform, policy) in &config.platforms {
            validate_packages(&policy.packages, Some(platform))?;
            validate_sources(&policy.sources, Some(platform))?;
        }

        let proxy = config.proxy.clone().normalized().or(env_proxy);

        debug!(
            "Policy store ready: {} base packages, {} platform sections",
            config.packages.len(),
            config.platforms.len()
        );

        Ok(Self { config, proxy })
    }

    /// Store over the built-in policy
    pub fn builtin(env_proxy: ProxyConfig) -> Result<Self> {
        Self::new(PolicyConfig::builtin()?, env_proxy)
    }

    /// Package flags shared by all platforms
    pub fn base_policy(&self) -> &PackagePolicy {
        &self.config.packages
    }

    /// Package flags for `platform`, empty if the store has no section for it
    pub fn override_for(&self, platform: &str) -> &PackagePolicy {
        self.config
            .platforms
            .get(platform)
            .map_or(&EMPTY_POLICY, |p| &p.packages)
    }

    /// Platform-independent source for `package`
    pub fn source_for(&self, package: &str) -> Option<&SourceDescriptor> {
        self.config.sources.get(package)
    }

    /// Source for `package` on `platform`
    ///
    /// A source declared under the platform replaces the shared one.
    pub fn source_for_platform(&self, package: &str, platform: &str) -> Option<&SourceDescriptor> {
        self.config
            .platforms
            .get(platform)
            .and_then(|p| p.sources.get(package))
            .or_else(|| self.source_for(package))
    }

    /// Effective proxy settings
    pub fn proxy_config(&self) -> &ProxyConfig {
        &self.proxy
    }

    pub fn configure_powershell(&self) -> bool {
        self.config.powershell.configure
    }

    /// Platform families with an override section
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.config.platforms.keys().map(String::as_str)
    }

    /// Whether the store has an override section for `platform`
    pub fn has_platform(&self, platform: &str) -> bool {
        self.config.platforms.contains_key(platform)
    }

    /// The underlying document
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }
}

fn validate_packages(packages: &PackagePolicy, platform: Option<&String>) -> Result<()> {
    match packages.keys().find(|name| name.trim().is_empty()) {
        Some(name) => Err(Error::InvalidPackageName {
            name: name.clone(),
            platform: platform.cloned(),
        }),
        None => Ok(()),
    }
}

fn validate_sources(
    sources: &BTreeMap<String, SourceDescriptor>,
    platform: Option<&String>,
) -> Result<()> {
    for (package, source) in sources {
        if package.trim().is_empty() {
            return Err(Error::InvalidPackageName {
                name: package.clone(),
                platform: platform.cloned(),
            });
        }
        if !source.is_well_formed() {
            return Err(Error::MalformedSourceDescriptor {
                package: package.clone(),
                platform: platform.cloned(),
            });
        }
        if !source.has_safe_file_name() {
            return Err(Error::UnsafeFileName {
                package: package.clone(),
                file_name: source.file_name.clone().unwrap_or_default(),
                platform: platform.cloned(),
            });
        }
    }
    Ok(())
}
