//! Named, overridable policy values.
//!
//! The defaults reproduce the behavior the notification pipeline has always
//! had; changing any of them is a deliberate caller decision, not an edit to
//! a buried constant.

/// Tunable constants for canonicalization, diffing, and rendering.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Fields whose value must keep its raw shape verbatim: null pruning does
    /// not descend into them. Historically the S3 access-control-list
    /// payload, whose consumers depend on explicit nulls.
    pub raw_shape_fields: Vec<String>,

    /// Top-level fields treated as composite sub-documents: a change inside
    /// them diffs recursively instead of replacing the whole blob.
    pub composite_fields: Vec<String>,

    /// Longest serialized field rendered side-by-side (previous and current
    /// in adjacent cells).
    pub short_field_len: usize,

    /// Longest serialized field rendered as an inline word-level diff.
    /// Anything larger is suppressed with a placeholder.
    pub long_field_len: usize,

    /// Recursion budget for the collation serializer. Values nested deeper
    /// than this fail with `CollationError` rather than overflowing.
    pub max_collation_depth: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            raw_shape_fields: vec!["AccessControlList".to_owned()],
            composite_fields: vec![
                "configuration".to_owned(),
                "supplementaryConfiguration".to_owned(),
            ],
            short_field_len: 40,
            long_field_len: 400,
            max_collation_depth: 128,
        }
    }
}

impl Policy {
    pub fn is_raw_shape(&self, field: &str) -> bool {
        self.raw_shape_fields.iter().any(|f| f == field)
    }

    pub fn is_composite(&self, field: &str) -> bool {
        self.composite_fields.iter().any(|f| f == field)
    }
}
