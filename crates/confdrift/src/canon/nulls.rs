//! Null-leaf pruning.
//!
//! Canonical records carry no null object entries: a null value and an
//! absent key are the same statement, and the diff walks `current`'s keys
//! only, so keeping both spellings would manufacture spurious changes.
//! Null *elements* of arrays are kept — dropping them would change element
//! positions and multiplicities.

use serde_json::{Map, Value};

use crate::policy::Policy;

/// Remove null-valued object entries everywhere except inside raw-shape
/// fields, whose payload must survive verbatim (their consumers depend on
/// explicit nulls).
pub fn prune_nulls(value: Value, policy: &Policy) -> Value {
    match value {
        Value::Object(map) => Value::Object(prune_map(map, policy)),
        Value::Array(arr) => Value::Array(arr.into_iter().map(|v| prune_nulls(v, policy)).collect()),
        other => other,
    }
}

fn prune_map(map: Map<String, Value>, policy: &Policy) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        if policy.is_raw_shape(&key) {
            out.insert(key, value);
        } else {
            out.insert(key, prune_nulls(value, policy));
        }
    }
    out
}
