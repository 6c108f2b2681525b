//! Recursive flattening of nested JSON records into single-level rows.
//!
//! Every leaf of the record tree becomes one entry whose key is the path from
//! the root: object field names and zero-based array indices joined with
//! [`SEPARATOR`]. `{"item": {"no": "3001", "type": ["BRICK"]}}` flattens to
//! `{"item_no": "3001", "item_type_0": "BRICK"}`.
//!
//! Empty objects and empty arrays have no leaves and therefore contribute no
//! keys at all; a record consisting only of `{"remarks": {}}` flattens to an
//! empty row, and a CSV batch made only of such records has no columns and
//! no rows.
//!
//! Two distinct paths can render to the same key (a field literally named
//! `item_no` next to an `item` object holding `no`). The later leaf in
//! traversal order wins and keeps the position of the first.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt::Write;

/// Joins path segments in flattened keys.
pub const SEPARATOR: char = '_';

/// A flattened record: path key to scalar value, in traversal order.
pub type FlatRecord = IndexMap<String, Value>;

/// Flattens one record. A scalar root yields a single entry under the empty key.
pub fn flatten(record: &Value) -> FlatRecord {
    let mut out = FlatRecord::new();
    let mut prefix = String::new();
    flatten_into(record, &mut prefix, &mut out);
    out
}

fn flatten_into(value: &Value, prefix: &mut String, out: &mut FlatRecord) {
    match value {
        Value::Object(fields) => {
            for (name, child) in fields {
                let len = prefix.len();
                prefix.push_str(name);
                prefix.push(SEPARATOR);
                flatten_into(child, prefix, out);
                prefix.truncate(len);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let len = prefix.len();
                // Writing to a String cannot fail.
                let _ = write!(prefix, "{index}{SEPARATOR}");
                flatten_into(child, prefix, out);
                prefix.truncate(len);
            }
        }
        scalar => {
            let key = prefix.strip_suffix(SEPARATOR).unwrap_or(prefix.as_str());
            out.insert(key.to_owned(), scalar.clone());
        }
    }
}

/// Number of scalar leaves in a record tree.
pub fn leaf_count(record: &Value) -> usize {
    match record {
        Value::Object(fields) => fields.values().map(leaf_count).sum(),
        Value::Array(items) => items.iter().map(leaf_count).sum(),
        _ => 1,
    }
}

/// Renders a scalar as cell or element text: strings verbatim, `null` empty,
/// numbers and booleans as their JSON literal.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
