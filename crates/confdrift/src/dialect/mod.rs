//! Dialect normalization — rewrite snapshot-dialect items into the shape
//! the live history API produces, then canonicalize.
//!
//! The two sources disagree on a handful of field names, on whether
//! `configuration` arrives as an object or as JSON text, and on the scalar
//! type of the state id. The rewrite table below is the complete list of
//! disagreements; everything else passes through untouched and converges in
//! the shared canonicalization pipeline.

mod snapshot;

pub use snapshot::{normalize, Snapshot};

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

fn fractional_seconds_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.\d*Z").expect("static regex"))
}

/// Apply the snapshot→live rewrite table to one item's key set.
///
/// Pure and order-independent: each rule touches exactly one key, no rule
/// reads another rule's output, and unrecognized keys pass through
/// unchanged.
pub fn rewrite_item(item: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(item.len());
    for (key, value) in item {
        match key.as_str() {
            // Object in the snapshot, JSON text in the live dialect.
            "configuration" => {
                out.insert(key, reserialize(value));
            }
            // Number in the snapshot, string in the live dialect.
            "configurationStateId" => {
                out.insert(key, coerce_to_string(value));
            }
            // Each entry value is independently JSON-text-encoded live.
            "supplementaryConfiguration" => {
                out.insert(key, reserialize_entries(value));
            }
            "relationships" => {
                out.insert(key, rename_relationship_names(value));
            }
            "configurationStateMd5Hash" => {
                out.insert("configurationItemMD5Hash".to_owned(), value);
            }
            "configurationItemVersion" => {
                out.insert("version".to_owned(), value);
            }
            "awsAccountId" => {
                out.insert("accountId".to_owned(), value);
            }
            "configurationItemCaptureTime" => {
                out.insert(key, strip_fractional_seconds(value));
            }
            _ => {
                out.insert(key, value);
            }
        }
    }
    out
}

fn reserialize(value: Value) -> Value {
    Value::String(value.to_string())
}

fn coerce_to_string(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::String(n.to_string()),
        other => other,
    }
}

fn reserialize_entries(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, entry) in map {
                out.insert(key, reserialize(entry));
            }
            Value::Object(out)
        }
        other => other,
    }
}

fn rename_relationship_names(value: Value) -> Value {
    match value {
        Value::Array(relationships) => Value::Array(
            relationships
                .into_iter()
                .map(|rel| match rel {
                    Value::Object(mut map) => {
                        if let Some(name) = map.remove("name") {
                            map.insert("relationshipName".to_owned(), name);
                        }
                        Value::Object(map)
                    }
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn strip_fractional_seconds(value: Value) -> Value {
    match value {
        Value::String(ts) => Value::String(
            fractional_seconds_regex()
                .replace_all(&ts, "Z")
                .into_owned(),
        ),
        other => other,
    }
}
