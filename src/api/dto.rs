//! Response envelopes and the normalization boundary.
//!
//! The service answers list endpoints either with `{ "data": [...],
//! "total"?: n }` or with a bare array, and single-record endpoints with
//! `{ "data": {...} }` or the bare record. The functions here are the only
//! place that knows about both shapes; everything downstream sees a
//! [`ListPage`] or a plain record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Item, ItemStatus, TypeFilter};
use crate::error::ClientError;

use super::client::decode;

/// One page of records in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    /// Records in service order.
    pub records: Vec<T>,
    /// Server-reported total across all pages, when sent.
    pub total: Option<u64>,
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total: None,
        }
    }
}

/// Body of `PUT /items/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    /// Target status, in wire form.
    pub status: ItemStatus,
}

/// Normalizes a list response of either shape.
///
/// A missing or null `data` is an empty page. `total` is read from the top
/// level or from a nested `pagination` object.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if the body is neither shape or a record
/// does not decode.
pub fn normalize_list<T: DeserializeOwned>(body: Value) -> Result<ListPage<T>, ClientError> {
    match body {
        Value::Array(_) => Ok(ListPage {
            records: decode(body)?,
            total: None,
        }),
        Value::Object(mut map) => {
            let total = map
                .get("total")
                .and_then(as_count)
                .or_else(|| map.get("pagination").and_then(|p| p.get("total")).and_then(as_count));
            let records = match map.remove("data") {
                None | Some(Value::Null) => Vec::new(),
                Some(data @ Value::Array(_)) => decode(data)?,
                Some(other) => {
                    return Err(ClientError::Decode(format!(
                        "expected a list in `data`, got {}",
                        kind_of(&other)
                    )));
                }
            };
            Ok(ListPage { records, total })
        }
        Value::Null => Ok(ListPage::default()),
        other => Err(ClientError::Decode(format!(
            "expected a list response, got {}",
            kind_of(&other)
        ))),
    }
}

/// Normalizes an item list and tags every record with a category.
///
/// Records the service returned without a type get the requested filter's
/// type; with an "all" filter they stay untagged.
///
/// # Errors
///
/// See [`normalize_list`].
pub fn normalize_items(body: Value, requested: TypeFilter) -> Result<ListPage<Item>, ClientError> {
    let mut page: ListPage<Item> = normalize_list(body)?;
    if let Some(item_type) = requested.item_type() {
        for item in &mut page.records {
            item.item_type.get_or_insert(item_type);
        }
    }
    Ok(page)
}

/// Normalizes a single-record response of either shape.
///
/// Returns `Ok(None)` when the body or its `data` is null.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if the record does not decode.
pub fn normalize_single<T: DeserializeOwned>(body: Value) -> Result<Option<T>, ClientError> {
    match body {
        Value::Null => Ok(None),
        Value::Object(mut map) if map.contains_key("data") => match map.remove("data") {
            None | Some(Value::Null) => Ok(None),
            Some(data) => decode(data).map(Some),
        },
        record => decode(record).map(Some),
    }
}

fn as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
