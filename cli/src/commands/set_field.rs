use anyhow::{Context, Result};
use baselinker_core::BaselinkerClient;
use colored::Colorize;

pub fn run(client: &BaselinkerClient, inventory: i64, product: i64, value: &str) -> Result<()> {
    let update = client
        .update_second_extra_field(product, inventory, value)
        .with_context(|| format!("updating product {product} in inventory {inventory}"))?;
    println!(
        "{} product {}: {} = '{}'",
        "Updated".green(),
        update.product_id,
        update.field.name,
        update.value
    );
    Ok(())
}
