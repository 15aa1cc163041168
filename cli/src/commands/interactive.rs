use anyhow::{Context, Result};
use baselinker_core::BaselinkerClient;
use colored::Colorize;
use dialoguer::Input;

use super::{choose_inventory, spinner};
use crate::render;

/// Line-mode loop: show the table, then repeatedly ask for a product ID and
/// a new Field2 value until the operator types `quit`.
pub fn run(client: &BaselinkerClient, inventory: Option<i64>) -> Result<()> {
    println!("=== Baselinker Product Management ===");
    let inventory = choose_inventory(client, inventory, true)?;
    println!("Using inventory: {} ({})", inventory.id, inventory.name);

    let progress = spinner("Fetching products...");
    let table = client.product_table(inventory.id);
    progress.finish_and_clear();
    let mut table = table.with_context(|| format!("loading inventory {}", inventory.id))?;

    println!("Found {} products in inventory {}", table.rows.len(), inventory.id);
    if table.rows.is_empty() {
        println!("No products found in the inventory.");
        return Ok(());
    }
    render::print_table(&table);

    let label = table.slots.second_label().to_string();
    println!("\n=== Update {label} ===");
    loop {
        let input: String = Input::new()
            .with_prompt("Enter product ID to update (or 'quit' to exit)")
            .interact_text()?;
        let input = input.trim();
        if input.eq_ignore_ascii_case("quit") {
            println!("Exiting...");
            break;
        }
        let Ok(product_id) = input.parse::<i64>() else {
            println!("Please enter a valid product ID (number) or 'quit'.");
            continue;
        };
        let Some(row) = table.row(product_id) else {
            println!("Product with ID {product_id} not found.");
            continue;
        };

        println!("\nSelected product:");
        render::print_product(row, &label);

        let value: String = Input::new()
            .with_prompt(format!("Enter new value for {label}"))
            .allow_empty(true)
            .interact_text()?;
        let value = value.trim();
        if value.is_empty() {
            println!("Value cannot be empty.");
            continue;
        }

        let progress = spinner(&format!("Updating product {product_id}..."));
        let result = client.update_second_extra_field(product_id, inventory.id, value);
        progress.finish_and_clear();
        match result {
            Ok(update) => {
                table.apply(&update);
                println!("{}", "Product updated successfully!".green());
                if let Some(row) = table.row(product_id) {
                    println!("\nUpdated product:");
                    render::print_product(row, &label);
                }
            }
            Err(e) => println!("{} {e}", "Failed to update product:".red()),
        }
    }
    Ok(())
}
