//! Error types.
//!
//! Every failure is local, deterministic, and attributable to one item or
//! field. Batch operations never abort on a single bad item: the offender is
//! captured as a [`RejectedItem`] and its siblings continue through the
//! pipeline.

use thiserror::Error;

use crate::record::ItemKey;

/// How much of an offending fragment to quote in error messages.
const FRAGMENT_PREVIEW_LEN: usize = 120;

/// Truncate an embedded fragment for inclusion in an error message.
pub(crate) fn fragment_preview(s: &str) -> String {
    if s.chars().count() <= FRAGMENT_PREVIEW_LEN {
        return s.to_owned();
    }
    let mut out: String = s.chars().take(FRAGMENT_PREVIEW_LEN).collect();
    out.push('…');
    out
}

/// A string-encoded JSON fragment could not be resolved to a native value.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed embedded JSON in fragment `{fragment}`: {source}")]
    Malformed {
        fragment: String,
        source: serde_json::Error,
    },

    #[error("invalid percent escape in fragment `{fragment}`")]
    BadPercentEscape { fragment: String },

    #[error("percent-decoded fragment `{fragment}` is not valid UTF-8")]
    NotUtf8 { fragment: String },

    #[error(transparent)]
    Collation(#[from] CollationError),
}

/// A value could not be serialized for ordering or equality.
///
/// Over a JSON value tree every scalar has a canonical text form, so the one
/// shape the collation serializer cannot represent is nesting deeper than its
/// recursion budget. Callers must treat the comparison as indeterminate —
/// never as equality.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollationError {
    #[error("value nesting exceeds the collation depth limit ({limit})")]
    TooDeep { limit: usize },
}

/// Top-level snapshot bytes could not be loaded at all.
///
/// Per-item failures inside an otherwise well-formed snapshot are *not*
/// `NormalizeError`s; they surface as [`RejectedItem`]s on the snapshot.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("snapshot bytes are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("snapshot root is not a JSON object")]
    RootShape,

    #[error("snapshot `configurationItems` is not an array")]
    ItemsShape,
}

/// A failure attributable to a single configuration item within a batch.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Collation(#[from] CollationError),

    #[error("item is not a JSON object")]
    NotAnObject,

    #[error("item is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("item field `{field}` is not a {expected}")]
    FieldShape {
        field: &'static str,
        expected: &'static str,
    },
}

/// An [`ItemError`] together with the item's position in its input batch and,
/// when it was recoverable, the item's identity key.
#[derive(Debug)]
pub struct RejectedItem {
    pub index: usize,
    pub identity: Option<ItemKey>,
    pub error: ItemError,
}

/// A value could not be serialized while rendering the report.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Collation(#[from] CollationError),

    #[error("record could not be serialized for display: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_preview_truncates() {
        let long = "x".repeat(500);
        let preview = fragment_preview(&long);
        assert_eq!(preview.chars().count(), 121);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn fragment_preview_short_passthrough() {
        assert_eq!(fragment_preview("{\"a\":1}"), "{\"a\":1}");
    }
}
