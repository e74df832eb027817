use anyhow::{Context as AnyhowContext, Result};
use provision::{PolicyConfig, PolicyStore, ProxyConfig, platform};
use std::path::{Path, PathBuf};

use crate::Context;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("devboot"))
}

/// Get the download cache directory
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .context("Could not determine cache directory")?;
    Ok(base.join("devboot"))
}

/// Resolve the policy file path: explicit flag first, then the default location
pub fn policy_path(ctx: &Context) -> Result<PathBuf> {
    match &ctx.config {
        Some(path) => Ok(expand(path)),
        None => Ok(config_dir()?.join("config.toml")),
    }
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

/// Where the active policy came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicySource {
    File(PathBuf),
    Builtin,
}

impl std::fmt::Display for PolicySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicySource::File(path) => write!(f, "{}", path.display()),
            PolicySource::Builtin => write!(f, "built-in policy"),
        }
    }
}

/// Load the policy document
///
/// A missing default file falls back to the built-in policy; a missing file
/// that was asked for explicitly is an error.
pub fn load_policy(ctx: &Context) -> Result<(PolicyConfig, PolicySource)> {
    let path = policy_path(ctx)?;

    if !path.exists() {
        if ctx.config.is_some() {
            anyhow::bail!("Policy file not found: {}", path.display());
        }
        log::info!("No policy at {}, using the built-in policy", path.display());
        let config = PolicyConfig::builtin().context("Built-in policy is invalid")?;
        return Ok((config, PolicySource::Builtin));
    }

    let config = PolicyConfig::load(&path)
        .with_context(|| format!("Could not load policy from {}", path.display()))?;
    Ok((config, PolicySource::File(path)))
}

/// Load and validate the policy, snapshotting the proxy environment
pub fn load_store(ctx: &Context) -> Result<(PolicyStore, PolicySource)> {
    let (config, source) = load_policy(ctx)?;
    let store = PolicyStore::new(config, ProxyConfig::from_env())
        .with_context(|| format!("Invalid policy in {source}"))?;
    Ok((store, source))
}

/// Platform family to resolve for: the flag if given, else this host
pub fn target_platform(arg: Option<&str>) -> String {
    arg.map_or_else(|| platform::detect().to_string(), platform::normalize)
}
