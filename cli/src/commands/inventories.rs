use anyhow::Result;
use baselinker_core::BaselinkerClient;

pub fn run(client: &BaselinkerClient) -> Result<()> {
    let inventories = client.list_inventories()?;
    if inventories.is_empty() {
        println!("No inventories found in your Baselinker account.");
        return Ok(());
    }
    println!("{:<12} Name", "ID");
    for inventory in &inventories {
        println!("{:<12} {}", inventory.id, inventory.name);
    }
    Ok(())
}
