use anyhow::Result;

use crate::Context;
use crate::config;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let (store, source) = config::load_store(ctx)?;

    let platforms: Vec<_> = store.platforms().collect();
    ui::success(&format!(
        "{source} is valid ({} base packages, {} platform overrides)",
        store.base_policy().len(),
        platforms.len()
    ));
    if !platforms.is_empty() {
        ui::dim(&format!("platforms: {}", platforms.join(", ")));
    }

    Ok(())
}
