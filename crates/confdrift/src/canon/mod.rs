//! Canonicalization — resolve string-encoded JSON into native values and
//! reduce a record to the one shape both dialects converge on.
//!
//! The history API serializes sub-documents as escaped JSON text, sometimes
//! through two or three layers of quoting and occasionally percent-encoded.
//! [`decode`] unwraps those layers; [`canonicalize`] then collation-sorts
//! every sequence and prunes null leaves so that records from either source
//! compare field-for-field.

mod decode;
mod nulls;

pub use decode::decode;
pub use nulls::prune_nulls;

use serde_json::Value;

use crate::collate;
use crate::error::DecodeError;
use crate::policy::Policy;

/// The string some fields carry instead of an absent sub-document. Decodes
/// to an empty object; the renderer displays a previous value of this shape
/// as `[]`.
pub(crate) const NULL_SENTINEL: &str = "null";

/// Fully canonicalize one value: decode embedded JSON, prune null object
/// entries (except under raw-shape fields), then collation-sort every
/// sequence. Pruning precedes the sort — removing a null entry changes an
/// element's sort key, and the output must be ordered by its final form.
///
/// Idempotent: canonicalizing a canonical value is a no-op.
pub fn canonicalize(value: Value, policy: &Policy) -> Result<Value, DecodeError> {
    let decoded = decode(value, policy.max_collation_depth)?;
    let pruned = prune_nulls(decoded, policy);
    Ok(collate::sort_arrays(pruned, policy.max_collation_depth)?)
}
