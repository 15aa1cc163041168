//! Building the `addInventoryProduct` call that edits the second extra field.
//!
//! `addInventoryProduct` with a `product_id` edits an existing product, but
//! whether omitted text fields are kept or cleared is up to the server. The
//! upsert therefore resends every text field of the detail record we read,
//! with only `name` and the target field replaced.

use serde::{Deserialize, Serialize};

use crate::types::{ExtraFieldDef, ProductDetail, ProductSummary, TextFields, UpsertProduct};

/// Where the identity fields of the edited product came from.
#[derive(Debug, Clone, Copy)]
pub enum ProductSource<'a> {
    /// A detail record, plus the product list's name for when the record
    /// carries none.
    Detail {
        detail: &'a ProductDetail,
        summary_name: Option<&'a str>,
    },
    /// Fallback when the product has no detail record.
    Summary(&'a ProductSummary),
}

impl ProductSource<'_> {
    /// `text_fields.name`, else the summary name, else the record's own
    /// name. `None` when nothing non-empty resolves.
    pub fn display_name(&self) -> Option<&str> {
        let name = match self {
            ProductSource::Detail {
                detail,
                summary_name,
            } => detail
                .text_fields
                .name()
                .filter(|n| !n.is_empty())
                .or(*summary_name)
                .filter(|n| !n.is_empty())
                .or(detail.name.as_deref()),
            ProductSource::Summary(summary) => Some(summary.name.as_str()),
        };
        name.filter(|n| !n.is_empty())
    }
}

/// A Field2 edit the connector accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldUpdate {
    pub product_id: i64,
    pub inventory_id: i64,
    pub field: ExtraFieldDef,
    pub value: String,
}

pub fn plan_upsert(
    inventory_id: i64,
    product_id: i64,
    target: &ExtraFieldDef,
    source: ProductSource<'_>,
    value: &str,
) -> UpsertProduct {
    let (sku, ean, mut text_fields) = match source {
        ProductSource::Detail { detail, .. } => (
            detail.sku.clone(),
            detail.ean.clone(),
            detail.text_fields.clone(),
        ),
        ProductSource::Summary(summary) => {
            (summary.sku.clone(), summary.ean.clone(), TextFields::new())
        }
    };
    // An unresolved name is left out so the stored one is not blanked.
    if let Some(name) = source.display_name() {
        text_fields.insert("name", name);
    }
    text_fields.insert(target.text_field_key(), value);

    UpsertProduct {
        inventory_id: inventory_id.to_string(),
        product_id: product_id.to_string(),
        sku,
        ean,
        text_fields,
    }
}
