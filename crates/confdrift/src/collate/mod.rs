//! Stable collation — a total, deterministic order over arbitrary JSON
//! values, and the equality primitive that ignores sequence order.
//!
//! The ordering key for any value is its canonical serialized text: object
//! keys sorted, deterministic number and string formatting. Comparing that
//! text lexicographically gives a total order consistent with structural
//! equality. The order is stable and deterministic, nothing more — it has no
//! business meaning and is used only to neutralize sequence-order noise from
//! sources that guarantee none.

use serde_json::Value;

use confdrift_util::sort::insertion_sort_by;
use confdrift_util::strings::escape;

use crate::error::CollationError;

/// Canonical serialized text of `value`: the collation sort key.
///
/// Object keys are insertion-sorted (objects here are small and often
/// nearly sorted already); numbers and strings use their single canonical
/// JSON form, so equal serialized text implies structural equality.
pub fn stable_string(value: &Value, depth_limit: usize) -> Result<String, CollationError> {
    let mut out = String::new();
    write_value(&mut out, value, 0, depth_limit)?;
    Ok(out)
}

fn write_value(
    out: &mut String,
    value: &Value,
    depth: usize,
    depth_limit: usize,
) -> Result<(), CollationError> {
    if depth > depth_limit {
        return Err(CollationError::TooDeep { limit: depth_limit });
    }
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push('"');
            out.push_str(&escape(s));
            out.push('"');
        }
        Value::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item, depth + 1, depth_limit)?;
            }
            out.push(']');
        }
        Value::Object(obj) => {
            let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            insertion_sort_by(&mut keys, |a, b| a.cmp(b));
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('"');
                out.push_str(&escape(key));
                out.push_str("\":");
                write_value(out, &obj[*key], depth + 1, depth_limit)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Re-sort `items` in place by stable key. The sort is stable, so duplicate
/// elements keep their relative input order and their multiplicity.
pub fn sort_slice(items: &mut Vec<Value>, depth_limit: usize) -> Result<(), CollationError> {
    let mut keyed = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        keyed.push((stable_string(&item, depth_limit)?, item));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    items.extend(keyed.into_iter().map(|(_, item)| item));
    Ok(())
}

/// Recursively re-sort every sequence in `value` by stable key,
/// independently at each level. Objects keep their key order.
pub fn sort_arrays(value: Value, depth_limit: usize) -> Result<Value, CollationError> {
    sort_arrays_at(value, 0, depth_limit)
}

fn sort_arrays_at(
    value: Value,
    depth: usize,
    depth_limit: usize,
) -> Result<Value, CollationError> {
    if depth > depth_limit {
        return Err(CollationError::TooDeep { limit: depth_limit });
    }
    match value {
        Value::Object(obj) => {
            let mut sorted = serde_json::Map::with_capacity(obj.len());
            for (key, item) in obj {
                sorted.insert(key, sort_arrays_at(item, depth + 1, depth_limit)?);
            }
            Ok(Value::Object(sorted))
        }
        Value::Array(arr) => {
            let mut items = Vec::with_capacity(arr.len());
            for item in arr {
                items.push(sort_arrays_at(item, depth + 1, depth_limit)?);
            }
            sort_slice(&mut items, depth_limit)?;
            Ok(Value::Array(items))
        }
        other => Ok(other),
    }
}

/// Deep equality disregarding sequence order but preserving multiplicities.
///
/// Two values with the same elements in different order are equal; two
/// values differing in the count of a duplicate element are not.
pub fn eq_unordered(a: &Value, b: &Value, depth_limit: usize) -> Result<bool, CollationError> {
    let a = sort_arrays(a.clone(), depth_limit)?;
    let b = sort_arrays(b.clone(), depth_limit)?;
    Ok(a == b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Policy;
    use serde_json::json;

    fn limit() -> usize {
        Policy::default().max_collation_depth
    }

    #[test]
    fn scalars() {
        assert_eq!(stable_string(&json!(null), limit()).unwrap(), "null");
        assert_eq!(stable_string(&json!(true), limit()).unwrap(), "true");
        assert_eq!(stable_string(&json!(42), limit()).unwrap(), "42");
        assert_eq!(stable_string(&json!(-1.5), limit()).unwrap(), "-1.5");
        assert_eq!(stable_string(&json!("s"), limit()).unwrap(), "\"s\"");
    }

    #[test]
    fn object_keys_sorted() {
        let v = json!({"b": 2, "a": 1, "c": {"z": 0, "y": 1}});
        assert_eq!(
            stable_string(&v, limit()).unwrap(),
            r#"{"a":1,"b":2,"c":{"y":1,"z":0}}"#
        );
    }

    #[test]
    fn strings_escaped_in_key_and_value() {
        let v = json!({"a\"b": "c\nd"});
        assert_eq!(
            stable_string(&v, limit()).unwrap(),
            r#"{"a\"b":"c\nd"}"#
        );
    }

    #[test]
    fn array_order_preserved_by_stringify() {
        // stable_string reports what is there; ordering is sort_arrays' job.
        assert_eq!(stable_string(&json!([3, 1, 2]), limit()).unwrap(), "[3,1,2]");
    }

    #[test]
    fn sort_arrays_every_level() {
        let v = json!({"xs": [3, 1, 2], "nested": [[2, 1], [1, 0]]});
        let sorted = sort_arrays(v, limit()).unwrap();
        assert_eq!(sorted, json!({"xs": [1, 2, 3], "nested": [[0, 1], [1, 2]]}));
    }

    #[test]
    fn sort_is_stable_for_duplicates() {
        let v = json!([{"a": 1}, {"a": 1}, {"a": 0}]);
        let sorted = sort_arrays(v, limit()).unwrap();
        assert_eq!(sorted, json!([{"a": 0}, {"a": 1}, {"a": 1}]));
    }

    #[test]
    fn eq_unordered_ignores_order() {
        let a = json!({"rel": [{"id": "a"}, {"id": "b"}]});
        let b = json!({"rel": [{"id": "b"}, {"id": "a"}]});
        assert!(eq_unordered(&a, &b, limit()).unwrap());
    }

    #[test]
    fn eq_unordered_respects_multiplicity() {
        let a = json!([1, 2, 2]);
        let b = json!([1, 2]);
        assert!(!eq_unordered(&a, &b, limit()).unwrap());
    }

    #[test]
    fn depth_limit_is_an_error_not_equality() {
        let mut v = json!("leaf");
        for _ in 0..10 {
            v = json!([v]);
        }
        let err = stable_string(&v, 4).unwrap_err();
        assert_eq!(err, CollationError::TooDeep { limit: 4 });
        assert!(eq_unordered(&v, &v, 4).is_err());
    }

    #[test]
    fn total_order_consistent_with_equality() {
        let a = json!({"x": [2, 1]});
        let b = json!({"x": [1, 2]});
        let sa = sort_arrays(a, limit()).unwrap();
        let sb = sort_arrays(b, limit()).unwrap();
        assert_eq!(
            stable_string(&sa, limit()).unwrap(),
            stable_string(&sb, limit()).unwrap()
        );
    }
}
