//! Recursive resolution of string-encoded JSON fragments.

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

use crate::collate;
use crate::error::{fragment_preview, DecodeError};

use super::NULL_SENTINEL;

/// Recursively resolve every string that semantically carries nested JSON.
///
/// Dispatch is on the string's first byte: `{` and `[` parse and recurse,
/// a leading quote unwraps one layer of JSON-string quoting and re-runs,
/// `%` percent-decodes and re-runs, the `null` sentinel becomes an empty
/// object, and anything else is a terminal string returned unchanged.
/// Arrays parsed out of strings are collation-sorted on the spot — that
/// source guarantees no element order.
///
/// Termination: each successful branch strictly unwraps one encoding layer
/// or exits at a terminal case.
pub fn decode(value: Value, depth_limit: usize) -> Result<Value, DecodeError> {
    match value {
        Value::String(s) => decode_str(&s, depth_limit),
        Value::Object(map) => Ok(Value::Object(decode_map(map, depth_limit)?)),
        Value::Array(arr) => {
            let mut items = Vec::with_capacity(arr.len());
            for item in arr {
                items.push(decode(item, depth_limit)?);
            }
            Ok(Value::Array(items))
        }
        other => Ok(other),
    }
}

fn decode_map(map: Map<String, Value>, depth_limit: usize) -> Result<Map<String, Value>, DecodeError> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        out.insert(key, decode(value, depth_limit)?);
    }
    Ok(out)
}

fn decode_str(s: &str, depth_limit: usize) -> Result<Value, DecodeError> {
    match s.as_bytes().first() {
        Some(b'{') => {
            let map: Map<String, Value> = parse_fragment(s)?;
            Ok(Value::Object(decode_map(map, depth_limit)?))
        }
        Some(b'[') => {
            let arr: Vec<Value> = parse_fragment(s)?;
            let mut items = Vec::with_capacity(arr.len());
            for item in arr {
                items.push(decode(item, depth_limit)?);
            }
            collate::sort_slice(&mut items, depth_limit)?;
            Ok(Value::Array(items))
        }
        Some(b'"') => {
            // Unwrap exactly one layer of JSON-string quoting, then re-run:
            // doubly and triply encoded sub-documents resolve one step at a
            // time.
            let unquoted: String = parse_fragment(s)?;
            decode_str(&unquoted, depth_limit)
        }
        Some(b'%') => {
            let expanded = percent_unescape(s)?;
            decode_str(&expanded, depth_limit)
        }
        _ if s == NULL_SENTINEL => Ok(Value::Object(Map::new())),
        _ => Ok(Value::String(s.to_owned())),
    }
}

fn parse_fragment<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DecodeError> {
    serde_json::from_str(s).map_err(|source| DecodeError::Malformed {
        fragment: fragment_preview(s),
        source,
    })
}

/// Query-unescape `s`: `+` is a space, `%xx` is a byte. Every `%` must be
/// followed by two hex digits — a dangling escape is an error, never a
/// silently-kept literal.
fn percent_unescape(s: &str) -> Result<String, DecodeError> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                return Err(DecodeError::BadPercentEscape {
                    fragment: fragment_preview(s),
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = s.replace('+', " ");
    match percent_decode_str(&spaced).decode_utf8() {
        Ok(decoded) => Ok(decoded.into_owned()),
        Err(_) => Err(DecodeError::NotUtf8 {
            fragment: fragment_preview(s),
        }),
    }
}
