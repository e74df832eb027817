use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Run a command with extra environment and inherited stdio
pub fn run_with_env<P: AsRef<Path>>(
    cmd: P,
    args: &[&str],
    env: &[(&str, String)],
) -> Result<ExitStatus> {
    let cmd = cmd.as_ref();
    Command::new(cmd)
        .args(args)
        .envs(env.iter().map(|(k, v)| (*k, v.as_str())))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute: {} {}", cmd.display(), args.join(" ")))
}

/// Run a command and capture trimmed stdout, `None` if it exits non-zero
pub fn run_capture_opt(cmd: &str, args: &[&str]) -> Result<Option<String>> {
    let output = Command::new(cmd)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    if output.status.success() {
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    } else {
        Ok(None)
    }
}

/// Check if a command exists
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_does_not_exist() {
        assert!(!command_exists("devboot-definitely-not-a-real-command"));
    }

    #[test]
    fn test_run_missing_command_is_error() {
        let result = run_with_env("devboot-definitely-not-a-real-command", &[], &[]);
        assert!(result.is_err());
    }
}
