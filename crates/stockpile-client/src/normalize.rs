//! # Response Normalizer
//!
//! The inventory API is not consistent about how it wraps lists. One
//! function accepts every shape it is known to send and rejects the rest:
//!
//! ```text
//! [ {...}, {...} ]                          bare array
//! { "products": [ ... ] }                   named field
//! { "data": [ ... ] }                       data wrapper
//! { "data": { "products": [ ... ] } }       named field inside data
//! anything else                             ShapeError
//! ```
//!
//! Single records may likewise arrive bare or under their name
//! (`{ "salesOrder": {...} }`).
//!
//! Inside an accepted collection, an item that does not decode is skipped
//! with a warning. The rest of the list still renders.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// A response body that matched none of the accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("expected an array, `{key}`, `data` or `data.{key}`, got {found}")]
    UnexpectedCollection { key: String, found: &'static str },

    #[error("expected a `{key}` record, got {found}")]
    UnexpectedRecord { key: String, found: &'static str },

    #[error("item {index} is not a valid record: {message}")]
    InvalidItem { index: usize, message: String },

    #[error("malformed body: {0}")]
    Malformed(String),
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn take_array(object: &mut Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    match object.remove(key) {
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            object.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

/// Extracts the item list from any accepted collection shape.
pub fn collection_items(value: Value, key: &str) -> Result<Vec<Value>, ShapeError> {
    let unexpected = |found| ShapeError::UnexpectedCollection {
        key: key.to_string(),
        found,
    };
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => {
            if let Some(items) = take_array(&mut object, key) {
                return Ok(items);
            }
            match object.remove("data") {
                Some(Value::Array(items)) => Ok(items),
                Some(Value::Object(mut data)) => {
                    take_array(&mut data, key).ok_or_else(|| unexpected("an object"))
                }
                _ => Err(unexpected("an object")),
            }
        }
        other => Err(unexpected(kind_of(&other))),
    }
}

/// Turns any accepted collection shape into typed records.
///
/// Items that fail to decode are dropped and logged with their index.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use stockpile_client::normalize::normalize_collection;
///
/// let wrapped: Vec<u32> = normalize_collection(json!({"data": {"ids": [1, "x", 2]}}), "ids").unwrap();
/// assert_eq!(wrapped, vec![1, 2]);
/// assert!(normalize_collection::<u32>(json!("nope"), "ids").is_err());
/// ```
pub fn normalize_collection<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, ShapeError> {
    let items = collection_items(value, key)?;
    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(collection = key, index, error = %e, "Skipping undecodable item");
                None
            }
        })
        .collect();
    if records.len() < total {
        warn!(collection = key, kept = records.len(), total, "Collection partially decoded");
    }
    Ok(records)
}

/// Turns a bare or named single-record body into a typed record.
pub fn normalize_record<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, ShapeError> {
    let record = match value {
        Value::Object(mut object) => match object.remove(key) {
            Some(inner @ Value::Object(_)) => inner,
            Some(other) => {
                object.insert(key.to_string(), other);
                unwrap_data(object, key)
            }
            None => unwrap_data(object, key),
        },
        other => {
            return Err(ShapeError::UnexpectedRecord {
                key: key.to_string(),
                found: kind_of(&other),
            })
        }
    };
    serde_json::from_value(record).map_err(|e| ShapeError::InvalidItem {
        index: 0,
        message: e.to_string(),
    })
}

fn unwrap_data(mut object: Map<String, Value>, key: &str) -> Value {
    match object.remove("data") {
        Some(Value::Object(mut data)) => match data.remove(key) {
            Some(inner @ Value::Object(_)) => inner,
            Some(other) => {
                data.insert(key.to_string(), other);
                Value::Object(data)
            }
            None => Value::Object(data),
        },
        Some(other) => {
            object.insert("data".to_string(), other);
            Value::Object(object)
        }
        None => Value::Object(object),
    }
}

/// A typed field next to the collection (e.g. `stats` beside
/// `expectedReturns`), when present and well formed.
pub fn sibling_field<T: DeserializeOwned>(value: &Value, field: &str) -> Option<T> {
    value
        .get(field)
        .or_else(|| value.get("data").and_then(|d| d.get(field)))
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    fn ids(items: Vec<Item>) -> Vec<u32> {
        items.into_iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_accepts_every_known_collection_shape() {
        let shapes = [
            json!([{"id": 1}, {"id": 2}]),
            json!({"products": [{"id": 1}, {"id": 2}]}),
            json!({"success": true, "data": [{"id": 1}, {"id": 2}]}),
            json!({"data": {"products": [{"id": 1}, {"id": 2}], "total": 2}}),
        ];
        for shape in shapes {
            let items: Vec<Item> = normalize_collection(shape, "products").unwrap();
            assert_eq!(ids(items), vec![1, 2]);
        }
    }

    #[test]
    fn test_rejects_other_shapes() {
        for shape in [
            json!(null),
            json!("products"),
            json!({"items": []}),
            json!({"products": {"id": 1}}),
            json!({"data": {"items": []}}),
        ] {
            let err = normalize_collection::<Item>(shape, "products").unwrap_err();
            assert!(matches!(err, ShapeError::UnexpectedCollection { .. }), "{err}");
        }
    }

    #[test]
    fn test_bad_item_is_skipped() {
        let items: Vec<Item> =
            normalize_collection(json!([{"id": 1}, {"id": "x"}, {"id": 3}]), "products").unwrap();
        assert_eq!(ids(items), vec![1, 3]);
    }

    #[test]
    fn test_unknown_sales_status_keeps_the_rest_of_the_list() {
        use stockpile_core::{SalesOrder, SalesStatus};

        let orders: Vec<SalesOrder> = normalize_collection(
            json!({"salesOrders": [
                {"_id": "s1", "status": "delivered", "totalAmount": 100},
                {"_id": "s2", "status": "processing", "totalAmount": 50},
                {"_id": "s3", "status": "pending", "totalAmount": 20,
                 "items": [{"productId": "p1", "quantity": null, "unitPrice": 5}]}
            ]}),
            "salesOrders",
        )
        .unwrap();
        let kept: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(kept, vec!["s1", "s3"]);
        assert_eq!(orders[0].status, SalesStatus::Delivered);
        assert_eq!(orders[1].items[0].quantity, 0);
    }

    #[test]
    fn test_empty_collection() {
        let items: Vec<Item> = normalize_collection(json!({"products": []}), "products").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_records_bare_or_named() {
        let bare: Item = normalize_record(json!({"id": 7}), "salesOrder").unwrap();
        let named: Item = normalize_record(json!({"salesOrder": {"id": 7}}), "salesOrder").unwrap();
        let data: Item = normalize_record(json!({"data": {"id": 7}}), "salesOrder").unwrap();
        assert_eq!(bare, named);
        assert_eq!(bare, data);
        assert!(normalize_record::<Item>(json!([]), "salesOrder").is_err());
    }

    #[test]
    fn test_sibling_field() {
        let body = json!({"expectedReturns": [], "stats": {"id": 3}});
        let stats: Option<Item> = sibling_field(&body, "stats");
        assert_eq!(stats, Some(Item { id: 3 }));
        assert_eq!(sibling_field::<Item>(&body, "missing"), None);
    }
}
