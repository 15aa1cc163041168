use anyhow::{Context, Result};
use baselinker_core::BaselinkerClient;

use super::{choose_inventory, spinner};
use crate::render;

/// Non-interactive dump of one inventory.
pub fn run(client: &BaselinkerClient, inventory: Option<i64>, json: bool) -> Result<()> {
    let inventory = choose_inventory(client, inventory, false)?;

    let progress = spinner("Fetching products...");
    let table = client.product_table(inventory.id);
    progress.finish_and_clear();
    let table = table.with_context(|| format!("loading inventory {}", inventory.id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }
    println!(
        "Found {} products in inventory {} ({})",
        table.rows.len(),
        inventory.id,
        inventory.name
    );
    if !table.rows.is_empty() {
        render::print_table(&table);
    }
    Ok(())
}
