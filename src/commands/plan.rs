use anyhow::Result;
use colored::Colorize;
use provision::{ProvisionPlan, Resolver};

use crate::Context;
use crate::config;
use crate::ui;

pub fn run(ctx: &Context, platform: Option<&str>, json: bool) -> Result<()> {
    let (store, source) = config::load_store(ctx)?;
    let platform = config::target_platform(platform);

    if !store.has_platform(&platform) && !json && !ctx.quiet {
        ui::warn(&format!(
            "Policy has no override for '{platform}', resolving base policy only"
        ));
    }

    let plan = Resolver::new(store).plan(&platform);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    ui::header(&format!("Provisioning plan for {platform}"));
    ui::kv("Policy", &source.to_string());
    print_plan(&plan, ctx.quiet);

    Ok(())
}

/// Print actions and ambient settings of a plan
pub fn print_plan(plan: &ProvisionPlan, quiet: bool) {
    if plan.actions.is_empty() {
        println!();
        println!("  {} Nothing to install", "✓".green());
        return;
    }

    ui::section(&format!("Install actions ({})", plan.actions.len()));
    for action in &plan.actions {
        println!("  {}", ui::action_line(action));
    }

    if quiet {
        return;
    }

    ui::section("Environment");
    match &plan.proxy.http_proxy {
        Some(proxy) => ui::kv("http_proxy", proxy),
        None => ui::kv("http_proxy", "(none)"),
    }
    if let Some(no_proxy) = &plan.proxy.no_proxy {
        ui::kv("no_proxy", no_proxy);
    }
    ui::kv("PowerShell", powershell_label(plan.configure_powershell));
}

/// The PowerShell flag is declared in the policy but applied elsewhere
fn powershell_label(configure: bool) -> &'static str {
    if configure {
        "configure=true (not handled by devboot)"
    } else {
        "configure=false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_powershell_label_does_not_claim_management() {
        assert_eq!(
            powershell_label(true),
            "configure=true (not handled by devboot)"
        );
        assert_eq!(powershell_label(false), "configure=false");
    }
}
