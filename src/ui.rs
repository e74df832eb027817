use colored::Colorize;
use provision::{ApplyResult, InstallAction};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// One-line rendering of an install action
pub fn action_line(action: &InstallAction) -> String {
    match action {
        InstallAction::PackageManagerInstall { name } => {
            format!("{} {:<24} {}", "+".green(), name, "package manager".dimmed())
        }
        InstallAction::DownloadAndInstall {
            name,
            url,
            checksum,
            installer_flags,
            ..
        } => {
            let mut detail = url.clone();
            if !installer_flags.is_empty() {
                detail.push_str(&format!(" [{installer_flags}]"));
            }
            if checksum.is_some() {
                detail.push_str(" (sha256)");
            }
            format!("{} {:<24} {}", "↓".cyan(), name, detail.dimmed())
        }
    }
}

/// Status symbol for an apply result
pub fn result_symbol(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::AlreadySatisfied => "○",
        ApplyResult::Installed => "✓",
        ApplyResult::Failed { .. } => "✗",
        ApplyResult::Skipped { .. } => "⊘",
    }
}

/// Print the devboot banner
pub fn banner() {
    println!(
        "{}",
        r"
     _            _                 _
  __| | _____   _| |__   ___   ___ | |_
 / _` |/ _ \ \ / / '_ \ / _ \ / _ \| __|
| (_| |  __/\ V /| |_) | (_) | (_) | |_
 \__,_|\___| \_/ |_.__/ \___/ \___/ \__|
"
        .cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_line_mentions_flags_and_checksum() {
        colored::control::set_override(false);
        let line = action_line(&InstallAction::DownloadAndInstall {
            name: "virtualbox".into(),
            url: "http://example.com/vb.dmg".into(),
            checksum: Some("4de4".into()),
            installer_flags: "/silent".into(),
            file_name: "vb.dmg".into(),
        });

        assert!(line.contains("virtualbox"));
        assert!(line.contains("[/silent]"));
        assert!(line.contains("(sha256)"));
    }

    #[test]
    fn test_result_symbol() {
        assert_eq!(result_symbol(&ApplyResult::Installed), "✓");
        assert_eq!(
            result_symbol(&ApplyResult::Failed {
                error: "boom".into()
            }),
            "✗"
        );
    }
}
