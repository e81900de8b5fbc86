//! Helpers over opaque ERP records.
//!
//! Collections are kept as plain JSON objects; only the handful of fields the
//! data layer itself inspects get typed accessors here.

use serde_json::{Map, Value};

/// One record of any collection (product, quant, picking, ...)
pub type Record = Map<String, Value>;

/// Id of a relational field: either a bare number or an ERP `[id, label]` pair
pub fn relation_id(value: &Value) -> Option<i64> {
    match value {
        Value::Array(pair) => pair.first().and_then(as_id),
        other => as_id(other),
    }
}

fn as_id(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

/// Numeric field, `None` when absent or `null`
pub fn number_field(record: &Record, field: &str) -> Option<f64> {
    match record.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => value.as_f64(),
    }
}

/// String field, `None` when absent or not a string
pub fn str_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

/// `id` of a record
pub fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(relation_id)
}

/// Keep only JSON objects from a raw payload array
pub fn into_records(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}
