//! Response-shape normalization.
//!
//! The connector returns product collections either as a JSON array or as an
//! object keyed by the stringified product ID, depending on the method and
//! on whether PHP saw sequential keys. Everything that depends on that
//! inconsistency lives here:
//!
//! * [`into_sequence`] always yields an ordered `Vec`.
//! * [`into_keyed`] always yields a map keyed by stringified product ID.
//!
//! Both treat `null` (or an absent key, passed as `Value::Null`) as empty.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::types::{DetailMap, ProductDetail};

/// Turn a list-or-keyed collection into a sequence.
///
/// Keyed objects yield their values in the order the server sent them; no
/// entry is dropped, so the output length equals the input length.
pub fn into_sequence<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, item)| item).collect(),
        other => {
            return Err(ApiError::DeserializationError(format!(
                "expected a list or an object keyed by ID, got {other}"
            )))
        }
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| ApiError::DeserializationError(e.to_string())))
        .collect()
}

/// Turn a list-or-keyed collection of detail records into a [`DetailMap`].
///
/// Keyed objects keep their keys and get `id` filled from the key when the
/// record does not carry one. Lists are keyed by each record's `id`, which is
/// then mandatory.
pub fn into_keyed(value: Value) -> Result<DetailMap, ApiError> {
    let mut keyed = DetailMap::new();
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, item) in map {
                let mut detail = parse_detail(item)?;
                if detail.id.is_none() {
                    detail.id = key.parse().ok();
                }
                keyed.insert(key, detail);
            }
        }
        Value::Array(items) => {
            for item in items {
                let detail = parse_detail(item)?;
                let id = detail.id.ok_or_else(|| {
                    ApiError::DeserializationError("detail record without id".to_string())
                })?;
                keyed.insert(id.to_string(), detail);
            }
        }
        other => {
            return Err(ApiError::DeserializationError(format!(
                "expected a list or an object keyed by ID, got {other}"
            )))
        }
    }
    Ok(keyed)
}

fn parse_detail(item: Value) -> Result<ProductDetail, ApiError> {
    serde_json::from_value(item).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// PHP encodes an empty associative array as `[]`.
pub(crate) fn object_or_empty_list(value: Value) -> Result<Map<String, Value>, String> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        Value::Array(items) if items.is_empty() => Ok(Map::new()),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect()),
        other => Err(format!("expected an object, got {other}")),
    }
}

/// Accept strings, numbers and `null` for free-text codes like `ean`.
pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!("expected text, got {other}"))),
    }
}
