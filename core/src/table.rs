//! Tabular view of an inventory shared by the CLI and the browser editor.
//!
//! A row joins the bulk summary with the product's detail record and reads
//! Field1/Field2 through the inventory's extra-field definitions by position.

use serde::{Deserialize, Serialize};

use crate::types::{DetailMap, ExtraFieldDef, ProductSummary};
use crate::update::FieldUpdate;

/// The first and second extra fields of an inventory, by server position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtraFieldSlots {
    pub first: Option<ExtraFieldDef>,
    pub second: Option<ExtraFieldDef>,
}

impl ExtraFieldSlots {
    pub fn from_definitions(definitions: &[ExtraFieldDef]) -> Self {
        Self {
            first: definitions.first().cloned(),
            second: definitions.get(1).cloned(),
        }
    }

    pub fn first_label(&self) -> &str {
        self.first.as_ref().map_or("Field1", |f| f.name.as_str())
    }

    pub fn second_label(&self) -> &str {
        self.second.as_ref().map_or("Field2", |f| f.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRow {
    pub id: i64,
    pub sku: String,
    pub ean: String,
    pub name: String,
    pub price: Option<f64>,
    pub field1: Option<String>,
    pub field2: Option<String>,
}

/// All rows of one inventory plus the definitions used to read them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductTable {
    pub inventory_id: i64,
    pub slots: ExtraFieldSlots,
    pub rows: Vec<ProductRow>,
}

impl ProductTable {
    pub fn row(&self, product_id: i64) -> Option<&ProductRow> {
        self.rows.iter().find(|row| row.id == product_id)
    }

    /// Reflect a successful update in the in-memory rows. Returns `false`
    /// when the product is not part of this table.
    pub fn apply(&mut self, update: &FieldUpdate) -> bool {
        if update.inventory_id != self.inventory_id {
            return false;
        }
        match self.rows.iter_mut().find(|row| row.id == update.product_id) {
            Some(row) => {
                row.field2 = Some(update.value.clone());
                true
            }
            None => false,
        }
    }
}

/// Join summaries with detail records. Rows follow the summary order.
pub fn build_rows(
    products: &[ProductSummary],
    details: &DetailMap,
    slots: &ExtraFieldSlots,
) -> Vec<ProductRow> {
    products
        .iter()
        .map(|product| {
            let text_fields = details.get(&product.id.to_string()).map(|d| &d.text_fields);
            let read = |slot: &Option<ExtraFieldDef>| {
                let field = slot.as_ref()?;
                text_fields?.extra_field(field.extra_field_id).map(str::to_string)
            };
            ProductRow {
                id: product.id,
                sku: product.sku.clone(),
                ean: product.ean.clone(),
                name: product.name.clone(),
                price: product.prices.first(),
                field1: read(&slots.first),
                field2: read(&slots.second),
            }
        })
        .collect()
}

/// A Field2 value as edited in a front-end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditedValue {
    pub product_id: i64,
    pub field2: String,
}

/// One pending Field2 edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldChange {
    pub product_id: i64,
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: String,
}

/// Compare edited Field2 values against the original rows.
///
/// A missing original value equals the empty string. Edits for products not
/// in `original` are ignored. Changes come out in row order.
pub fn diff_field2(original: &[ProductRow], edited: &[EditedValue]) -> Vec<FieldChange> {
    original
        .iter()
        .filter_map(|row| {
            let edit = edited.iter().rev().find(|e| e.product_id == row.id)?;
            let old = row.field2.as_deref().unwrap_or("");
            (old != edit.field2).then(|| FieldChange {
                product_id: row.id,
                name: row.name.clone(),
                old_value: row.field2.clone(),
                new_value: edit.field2.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::ProductDetail;

    fn defs() -> Vec<ExtraFieldDef> {
        vec![
            ExtraFieldDef { extra_field_id: 10, name: "Color".to_string() },
            ExtraFieldDef { extra_field_id: 11, name: "Note".to_string() },
        ]
    }

    fn row(id: i64, field2: Option<&str>) -> ProductRow {
        ProductRow {
            id,
            sku: format!("SKU-{id}"),
            ean: String::new(),
            name: format!("Product {id}"),
            price: None,
            field1: None,
            field2: field2.map(str::to_string),
        }
    }

    fn edit(product_id: i64, field2: &str) -> EditedValue {
        EditedValue { product_id, field2: field2.to_string() }
    }

    #[test]
    fn slots_follow_position() {
        let slots = ExtraFieldSlots::from_definitions(&defs());
        assert_eq!(slots.first.unwrap().extra_field_id, 10);
        assert_eq!(slots.second.unwrap().extra_field_id, 11);
    }

    #[test]
    fn slots_with_one_definition() {
        let slots = ExtraFieldSlots::from_definitions(&defs()[..1]);
        assert!(slots.first.is_some());
        assert!(slots.second.is_none());
        assert_eq!(slots.second_label(), "Field2");
    }

    #[test]
    fn rows_read_fields_by_definition_id() {
        let products: Vec<ProductSummary> = serde_json::from_value(json!([
            {"id": 5, "sku": "A", "name": "Alpha", "prices": {"1": 9.5}},
            {"id": 9, "sku": "B", "name": "Beta"}
        ]))
        .unwrap();
        let detail: ProductDetail = serde_json::from_value(json!({
            "text_fields": {"extra_field_11": "fragile", "extra_field_10": "red"}
        }))
        .unwrap();
        let details = DetailMap::from([("5".to_string(), detail)]);

        let rows = build_rows(&products, &details, &ExtraFieldSlots::from_definitions(&defs()));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price, Some(9.5));
        assert_eq!(rows[0].field1.as_deref(), Some("red"));
        assert_eq!(rows[0].field2.as_deref(), Some("fragile"));
        assert_eq!(rows[1].field1, None);
        assert_eq!(rows[1].field2, None);
    }

    #[test]
    fn diff_reports_only_changed_rows_in_order() {
        let original = vec![row(1, Some("a")), row(2, Some("b")), row(3, None)];
        let edited = vec![edit(3, "new"), edit(2, "b"), edit(1, "A")];
        let changes = diff_field2(&original, &edited);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].product_id, 1);
        assert_eq!(changes[0].old_value.as_deref(), Some("a"));
        assert_eq!(changes[0].new_value, "A");
        assert_eq!(changes[1].product_id, 3);
        assert_eq!(changes[1].old_value, None);
    }

    #[test]
    fn diff_treats_missing_value_as_empty() {
        let original = vec![row(1, None)];
        assert!(diff_field2(&original, &[edit(1, "")]).is_empty());
    }

    #[test]
    fn diff_ignores_unknown_products() {
        let original = vec![row(1, Some("a"))];
        assert!(diff_field2(&original, &[edit(99, "x")]).is_empty());
    }

    #[test]
    fn apply_updates_matching_row() {
        let mut table = ProductTable {
            inventory_id: 7,
            slots: ExtraFieldSlots::from_definitions(&defs()),
            rows: vec![row(1, Some("a"))],
        };
        let update = FieldUpdate {
            product_id: 1,
            inventory_id: 7,
            field: defs()[1].clone(),
            value: "b".to_string(),
        };
        assert!(table.apply(&update));
        assert_eq!(table.row(1).unwrap().field2.as_deref(), Some("b"));

        let other = FieldUpdate { product_id: 2, ..update };
        assert!(!table.apply(&other));
    }
}
