use anyhow::Result;
use colored::Colorize;
use provision::Resolver;

use crate::Context;
use crate::config;
use crate::ui;

pub fn run(ctx: &Context, platform: Option<&str>) -> Result<()> {
    let (store, source) = config::load_store(ctx)?;
    let platform = config::target_platform(platform);
    let resolver = Resolver::new(store);
    let store = resolver.store();

    ui::header(&format!("Package policy for {platform}"));
    ui::kv("Policy", &source.to_string());
    let known: Vec<_> = store.platforms().collect();
    ui::kv(
        "Platforms",
        &if known.is_empty() {
            "(none)".to_string()
        } else {
            known.join(", ")
        },
    );

    println!();
    let overrides = store.override_for(&platform);
    for (name, enabled) in resolver.merged_policy(&platform) {
        let mark = if enabled { "✓".green() } else { "·".dimmed() };
        let origin = if overrides.contains_key(&name) {
            format!("{platform} override")
        } else {
            "base".to_string()
        };
        let source = store
            .source_for_platform(&name, &platform)
            .and_then(|s| s.url.as_deref())
            .unwrap_or("package manager");

        println!(
            "  {} {:<24} {:<20} {}",
            mark,
            name,
            origin.dimmed(),
            source.dimmed()
        );
    }

    Ok(())
}
