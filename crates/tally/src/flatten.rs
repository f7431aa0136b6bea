// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use serde_json::Value;
use tracing::debug;

use crate::value::{FieldMap, FieldValue};

pub type FlatRecord = FieldMap;

const LIST_SEPARATOR: &str = ", ";

pub fn flatten_records(records: &[FieldValue]) -> Vec<FlatRecord> {
    records.iter().map(flatten_record).collect()
}

/// Accepts whatever the backend put in `data`. Anything other than an array has no rows.
pub fn flatten_json(data: &Value) -> Vec<FlatRecord> {
    match data {
        Value::Array(items) => {
            let records: Vec<FieldValue> = items.iter().map(FieldValue::from).collect();
            flatten_records(&records)
        }
        other => {
            debug!(kind = json_kind(other), "record payload is not an array");
            Vec::new()
        }
    }
}

/// Splices nested maps one level up and joins lists into display strings. Nested keys
/// overwrite earlier keys in place; a nested map's own maps and lists are left opaque.
pub fn flatten_record(record: &FieldValue) -> FlatRecord {
    let Some(fields) = record.as_map() else {
        return FlatRecord::new();
    };
    let mut flat = FlatRecord::with_capacity(fields.len());
    for (key, value) in fields {
        match value {
            FieldValue::Map(nested) => {
                for (nested_key, nested_value) in nested {
                    flat.insert(nested_key.clone(), nested_value.clone());
                }
            }
            FieldValue::List(items) => {
                flat.insert(key.clone(), FieldValue::Text(join_list(items)));
            }
            scalar => {
                flat.insert(key.clone(), scalar.clone());
            }
        }
    }
    flat
}

fn join_list(items: &[FieldValue]) -> String {
    items
        .iter()
        .map(FieldValue::display_string)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<FieldValue> {
        match value {
            Value::Array(items) => items.into_iter().map(FieldValue::from).collect(),
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn test_nested_map_is_spliced() {
        let flat = flatten_records(&records(json!([
            { "info": { "name": "Apple", "category": "Fruit" }, "revenue": 10 }
        ])));
        assert_eq!(flat.len(), 1);
        let keys: Vec<&str> = flat[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "category", "revenue"]);
        assert_eq!(flat[0]["name"], FieldValue::text("Apple"));
    }

    #[test]
    fn test_lists_are_joined() {
        let flat = flatten_records(&records(json!([{ "sales": [10, 20.5, "x", null] }])));
        assert_eq!(flat[0]["sales"], FieldValue::text("10, 20.5, x, null"));
    }

    #[test]
    fn test_nested_key_overwrites_in_place() {
        let flat = flatten_records(&records(json!([
            { "name": "outer", "meta": { "name": "inner", "extra": true } }
        ])));
        let keys: Vec<&str> = flat[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "extra"]);
        assert_eq!(flat[0]["name"], FieldValue::text("inner"));
    }

    #[test]
    fn test_later_top_level_field_overwrites_nested() {
        let flat = flatten_records(&records(json!([
            { "meta": { "name": "inner" }, "name": "outer" }
        ])));
        assert_eq!(flat[0]["name"], FieldValue::text("outer"));
    }

    #[test]
    fn test_only_one_level_is_flattened() {
        let flat = flatten_records(&records(json!([
            { "a": { "b": { "c": 1 }, "tags": ["x", "y"] } }
        ])));
        assert_eq!(flat[0]["b"], FieldValue::from(json!({ "c": 1 })));
        assert_eq!(flat[0]["tags"], FieldValue::from(json!(["x", "y"])));
    }

    #[test]
    fn test_non_map_records_keep_their_slot() {
        let flat = flatten_records(&records(json!([1, "two", { "k": 3 }])));
        assert_eq!(flat.len(), 3);
        assert!(flat[0].is_empty());
        assert!(flat[1].is_empty());
        assert_eq!(flat[2]["k"], FieldValue::Number(3.0));
    }

    #[test]
    fn test_malformed_payloads_are_empty() {
        assert!(flatten_json(&json!({ "not": "an array" })).is_empty());
        assert!(flatten_json(&Value::Null).is_empty());
        assert!(flatten_json(&json!([])).is_empty());
        assert_eq!(flatten_json(&json!([{ "a": 1 }])).len(), 1);
    }
}
