//! Fixed-width terminal rendering of product tables.

use baselinker_core::{ProductRow, ProductTable};

const NOT_AVAILABLE: &str = "N/A";

/// Cut `text` to at most `width` characters.
fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NOT_AVAILABLE)
}

fn price(row: &ProductRow) -> String {
    row.price
        .map(|p| format!("{p:.2}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_row(row: &ProductRow) -> String {
    format!(
        "{:<12} {:<15} {:<15} {:<20} {:<10} {:<15} {:<15}",
        row.id,
        clip(or_na(Some(row.sku.as_str())), 15),
        clip(or_na(Some(row.ean.as_str())), 15),
        clip(or_na(Some(row.name.as_str())), 19),
        price(row),
        clip(or_na(row.field1.as_deref()), 15),
        clip(or_na(row.field2.as_deref()), 15),
    )
}

pub fn print_table(table: &ProductTable) {
    println!("\n=== All Products ===");
    println!(
        "{:<12} {:<15} {:<15} {:<20} {:<10} {:<15} {:<15}",
        "ID",
        "SKU",
        "EAN",
        "Name",
        "Price",
        clip(table.slots.first_label(), 15),
        clip(table.slots.second_label(), 15),
    );
    println!("{}", "-".repeat(108));
    for row in &table.rows {
        println!("{}", format_row(row));
    }
}

pub fn print_product(row: &ProductRow, field_label: &str) {
    println!("  ID: {}", row.id);
    println!("  SKU: {}", or_na(Some(row.sku.as_str())));
    println!("  Name: {}", or_na(Some(row.name.as_str())));
    println!("  {field_label}: {}", or_na(row.field2.as_deref()));
}
