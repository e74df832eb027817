mod cli;
mod commands;
mod config;
mod installer;
mod progress;
mod runner;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Explicit policy file from `--config` / `DEVBOOT_CONFIG`
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
    };

    match cli.command {
        Command::Plan(args) => {
            commands::plan::run(&ctx, args.platform.platform.as_deref(), args.json)
        }
        Command::Apply(args) => commands::apply::run(
            &ctx,
            args.platform.platform.as_deref(),
            args.dry_run,
            args.yes,
        ),
        Command::Show(args) => commands::show::run(&ctx, args.platform.as_deref()),
        Command::Validate => commands::validate::run(&ctx),
        Command::Init { force } => commands::init::run(&ctx, force),
        Command::Doctor => commands::doctor::run(&ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "devboot", &mut io::stdout());
            Ok(())
        }
    }
}
