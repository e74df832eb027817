//! # Provision
//!
//! Declarative package provisioning for developer workstations.
//!
//! This crate turns a desired-state description into an ordered, idempotent
//! list of install actions for one platform, and can drive an external
//! installer through that list.
//!
//! ## Core Concepts
//!
//! - **PolicyStore**: Validated desired state (package flags, platform
//!   overrides, download sources, proxy and shell settings)
//! - **Resolver**: Pure function from (store, platform) to install actions
//! - **InstallAction**: One unit of work for an installer
//! - **Installer**: The collaborator that actually performs actions
//!
//! ## Example
//!
//! ```
//! use provision::{InstallAction, PolicyConfig, PolicyStore, ProxyConfig, Resolver};
//!
//! let config = PolicyConfig::from_toml_str(
//!     r#"
//!     [packages]
//!     git = true
//!     atom = false
//!     vscode = true
//!
//!     [platforms.windows.packages]
//!     kdiff3 = true
//!     "#,
//! )?;
//!
//! let resolver = Resolver::new(PolicyStore::new(config, ProxyConfig::default())?);
//! let names: Vec<_> = resolver
//!     .resolve("windows")
//!     .iter()
//!     .map(InstallAction::name)
//!     .map(str::to_string)
//!     .collect();
//!
//! assert_eq!(names, ["git", "kdiff3", "vscode"]);
//! # Ok::<(), provision::Error>(())
//! ```
//!
//! ## Collaborator Traits
//!
//! - [`Installer`]: Performs package-manager installs and downloads
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations

pub mod context;
pub mod error;
pub mod executor;
pub mod platform;
pub mod resolver;
pub mod store;
pub mod types;

// Re-export main types at crate root
pub use context::{
    AutoConfirm, AutoDecline, ConfirmCallback, Installer, InstallerError, NoProgress,
    ProgressCallback,
};
pub use error::{Error, Result};
pub use executor::{execute, execute_simple};
pub use resolver::Resolver;
pub use store::{DEFAULT_POLICY, PlatformPolicy, PolicyConfig, PolicyStore, PowerShellConfig};
pub use types::{
    ApplyResult, ExecuteOptions, ExecuteSummary, InstallAction, PackagePolicy, ProvisionPlan,
    ProxyConfig, SourceDescriptor,
};
