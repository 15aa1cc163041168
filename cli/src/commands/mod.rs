pub mod interactive;
pub mod inventories;
pub mod report;
pub mod set_field;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use baselinker_core::{BaselinkerClient, Inventory};
use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner on stderr while a blocking call runs.
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Resolve the inventory to work on: the requested one, a picked one when
/// `prompt` is set and several exist, otherwise the first.
pub(crate) fn choose_inventory(
    client: &BaselinkerClient,
    requested: Option<i64>,
    prompt: bool,
) -> Result<Inventory> {
    let progress = spinner("Fetching available inventories...");
    let inventories = client.list_inventories();
    progress.finish_and_clear();
    let mut inventories = inventories.context("Error connecting to Baselinker API")?;

    if inventories.is_empty() {
        bail!("No inventories found in your Baselinker account.");
    }
    if let Some(id) = requested {
        return match inventories.iter().position(|inv| inv.id == id) {
            Some(index) => Ok(inventories.swap_remove(index)),
            None => bail!("Inventory {id} not found."),
        };
    }
    if prompt && inventories.len() > 1 {
        let labels: Vec<String> = inventories
            .iter()
            .map(|inv| format!("{} (ID: {})", inv.name, inv.id))
            .collect();
        let index = Select::new()
            .with_prompt("Select inventory")
            .items(&labels)
            .default(0)
            .interact()?;
        return Ok(inventories.swap_remove(index));
    }
    Ok(inventories.swap_remove(0))
}
