//! Typed records for the connector payloads.
//!
//! # Design
//! Required fields (`inventory_id`, product `id`, `extra_field_id`) fail
//! deserialization when missing; everything else defaults. The upstream
//! service is PHP-backed, so empty mappings may arrive as `[]` and codes such
//! as `ean` may arrive as numbers or `null`. `Prices` and `TextFields` absorb
//! those shapes so callers never see them.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::normalize::{lenient_string, object_or_empty_list};

/// Detail records keyed by the product ID rendered as a string.
pub type DetailMap = BTreeMap<String, ProductDetail>;

/// A named product collection upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inventory {
    #[serde(rename = "inventory_id", alias = "id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Product as returned by the bulk listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSummary {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sku: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ean: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default)]
    pub prices: Prices,
}

/// Product as returned by `getInventoryProductsData`.
///
/// `id` is optional because keyed responses only carry it in the key;
/// `normalize::into_keyed` fills it in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sku: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ean: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prices: Prices,
    #[serde(default)]
    pub text_fields: TextFields,
}

/// A user-defined per-inventory text attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtraFieldDef {
    pub extra_field_id: i64,
    #[serde(default)]
    pub name: String,
}

impl ExtraFieldDef {
    /// Key under which this field's value lives in `text_fields`.
    pub fn text_field_key(&self) -> String {
        extra_field_key(self.extra_field_id)
    }
}

pub fn extra_field_key(field_id: i64) -> String {
    format!("extra_field_{field_id}")
}

/// Parameters of an `addInventoryProduct` call that edits an existing
/// product. Both IDs travel as strings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpsertProduct {
    pub inventory_id: String,
    pub product_id: String,
    pub sku: String,
    pub ean: String,
    pub text_fields: TextFields,
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// Price per price group, in the order the server sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prices(Vec<(String, f64)>);

impl Prices {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self(entries)
    }

    /// The first listed price, shown as "the" price in tables.
    pub fn first(&self) -> Option<f64> {
        self.0.first().map(|(_, price)| *price)
    }

    pub fn get(&self, group: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(key, _)| key == group)
            .map(|(_, price)| *price)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Prices {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (group, price) in &self.0 {
            map.serialize_entry(group, price)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Prices {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let map = object_or_empty_list(value).map_err(D::Error::custom)?;
        let mut entries = Vec::with_capacity(map.len());
        // One unreadable price must not sink the whole product list.
        for (group, raw) in map {
            let price = match &raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            match price {
                Some(price) => entries.push((group, price)),
                None => tracing::warn!(group = %group, value = %raw, "skipping unreadable price"),
            }
        }
        Ok(Self(entries))
    }
}

// ---------------------------------------------------------------------------
// Text fields
// ---------------------------------------------------------------------------

/// Product text fields (`name`, `description`, `extra_field_<id>`, ...).
///
/// Values are kept as raw JSON so a read-modify-write resends fields we do
/// not interpret exactly as received.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct TextFields(Map<String, Value>);

impl TextFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text value under `key`, if it is a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn extra_field(&self, field_id: i64) -> Option<&str> {
        self.text(&extra_field_key(field_id))
    }

    /// Set `key`, keeping its position when it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Value::String(value.into()));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TextFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl<'de> Deserialize<'de> for TextFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        object_or_empty_list(value).map(Self).map_err(D::Error::custom)
    }
}
