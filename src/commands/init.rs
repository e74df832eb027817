use anyhow::{Context as AnyhowContext, Result};
use provision::DEFAULT_POLICY;
use std::fs;
use std::path::Path;

use crate::Context;
use crate::config;
use crate::ui;

pub fn run(ctx: &Context, force: bool) -> Result<()> {
    let path = config::policy_path(ctx)?;
    write_default_policy(&path, force)?;
    ui::success(&format!("Wrote policy to {}", path.display()));
    ui::dim("Edit it, then run `devboot plan` to preview");
    Ok(())
}

fn write_default_policy(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_POLICY)
        .with_context(|| format!("Could not write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use provision::PolicyConfig;

    #[test]
    fn test_writes_loadable_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_policy(&path, false).unwrap();
        let config = PolicyConfig::load(&path).unwrap();
        assert_eq!(config, PolicyConfig::builtin().unwrap());
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "# mine\n").unwrap();

        assert!(write_default_policy(&path, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");

        write_default_policy(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_POLICY);
    }
}
