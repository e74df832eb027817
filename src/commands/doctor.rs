use anyhow::Result;
use colored::Colorize;
use provision::{PolicyStore, ProxyConfig, platform};

use crate::Context;
use crate::config::{self, PolicySource};
use crate::installer::PackageManager;
use crate::runner;
use crate::ui;

struct Issue {
    summary: String,
    fix: Option<String>,
}

pub fn run(ctx: &Context) -> Result<()> {
    ui::banner();
    ui::header("Workstation Health Check");

    let mut issues: Vec<Issue> = Vec::new();

    let store = check_policy(ctx, &mut issues);
    check_package_manager(&mut issues);
    check_proxy(&effective_proxy(store.as_ref()));

    println!();
    if issues.is_empty() {
        ui::success("Ready to provision!");
    } else {
        ui::header(&format!("{} Issue(s) Found", issues.len()));
        for (i, issue) in issues.iter().enumerate() {
            println!("  {}  {}", format!("{}.", i + 1).bold(), issue.summary);
            if let Some(fix) = &issue.fix {
                println!("      {} {}", "Fix:".cyan(), fix);
            }
        }
    }

    Ok(())
}

fn check_policy(ctx: &Context, issues: &mut Vec<Issue>) -> Option<PolicyStore> {
    ui::section("Policy");

    match config::load_store(ctx) {
        Ok((store, PolicySource::Builtin)) => {
            println!(
                "  {} using built-in policy ({} base packages)",
                "○".dimmed(),
                store.base_policy().len()
            );
            ui::dim("run `devboot init` to write an editable copy");
            Some(store)
        }
        Ok((store, source)) => {
            println!(
                "  {} {} ({} base packages)",
                "✓".green(),
                source,
                store.base_policy().len()
            );
            Some(store)
        }
        Err(e) => {
            println!("  {} {}", "✗".red(), format!("{e:#}").red());
            issues.push(Issue {
                summary: "Policy file cannot be loaded".into(),
                fix: Some("Fix the reported error, then run `devboot validate`".into()),
            });
            None
        }
    }
}

fn check_package_manager(issues: &mut Vec<Issue>) {
    ui::section("Package Manager");

    let family = platform::detect();
    let Some(pm) = PackageManager::for_platform(family) else {
        println!(
            "  {} no package manager support on {}",
            "⚠".yellow(),
            family
        );
        issues.push(Issue {
            summary: format!("Platform '{family}' only supports direct downloads"),
            fix: None,
        });
        return;
    };

    if runner::command_exists(pm.program) {
        println!("  {} {} - {}", "✓".green(), pm.program, family.dimmed());
    } else {
        println!("  {} {} {}", "✗".red(), pm.program, "(missing)".red());
        let hint = match pm.program {
            "brew" => "Visit https://brew.sh for install instructions",
            _ => "Visit https://chocolatey.org/install for install instructions",
        };
        issues.push(Issue {
            summary: format!("{} is not installed", pm.program),
            fix: Some(hint.to_string()),
        });
    }
}

/// Proxy `apply` would use: the store's layered settings, else the environment
fn effective_proxy(store: Option<&PolicyStore>) -> ProxyConfig {
    store.map_or_else(ProxyConfig::from_env, |s| s.proxy_config().clone())
}

fn check_proxy(proxy: &ProxyConfig) {
    ui::section("Proxy");

    match &proxy.http_proxy {
        Some(p) => ui::kv("http_proxy", p),
        None => ui::dim("no proxy configured"),
    }
    if let Some(no_proxy) = &proxy.no_proxy {
        ui::kv("no_proxy", no_proxy);
    }
}
