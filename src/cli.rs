use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "devboot")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Bootstrap a developer workstation from a declarative package policy",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Policy file (defaults to ~/.config/devboot/config.toml)
    #[arg(short, long, global = true, env = "DEVBOOT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the install actions for a platform
    Plan(PlanArgs),

    /// Resolve the policy and install everything it enables
    Apply(ApplyArgs),

    /// Show the merged package policy, including disabled packages
    Show(PlatformArgs),

    /// Check that the policy file is valid
    Validate,

    /// Write the built-in policy to the config path
    Init {
        /// Overwrite an existing policy file
        #[arg(short, long)]
        force: bool,
    },

    /// Check that package managers and config are in place
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PlatformArgs {
    /// Platform family to resolve for (windows, mac_os_x, ...). Defaults to this host
    #[arg(short, long)]
    pub platform: Option<String>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Show what would be installed without installing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from(["devboot", "apply", "-p", "windows", "--dry-run", "-y"])
            .unwrap();
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.platform.platform.as_deref(), Some("windows"));
                assert!(args.dry_run);
                assert!(args.yes);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["devboot", "plan", "--json", "-vv", "--config", "p.toml"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("p.toml")));
    }
}
