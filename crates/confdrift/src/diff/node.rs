//! The diff tree.

use indexmap::IndexMap;
use serde_json::Value;

/// One changed field: the previous scalar/array value, or a recursively
/// diffed composite sub-document.
///
/// Only the previous value is retained — the current value is read from the
/// live record the report is built against.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEntry {
    Previous(Value),
    Nested(DiffNode),
}

/// Tree of changed fields between two canonical records.
///
/// Lives beside the record it describes, never inside it. Keys appear in the
/// order the walk found them, which follows the current record's field
/// order. Empty iff the two records are collation-equal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiffNode {
    entries: IndexMap<String, DiffEntry>,
}

impl DiffNode {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&DiffEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DiffEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The flat changed fields, skipping composite sub-documents.
    pub fn scalar_entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            DiffEntry::Previous(value) => Some((k.as_str(), value)),
            DiffEntry::Nested(_) => None,
        })
    }

    /// The recursively diffed composite sub-documents.
    pub fn nested_entries(&self) -> impl Iterator<Item = (&str, &DiffNode)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            DiffEntry::Nested(node) => Some((k.as_str(), node)),
            DiffEntry::Previous(_) => None,
        })
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, entry: DiffEntry) {
        self.entries.insert(key.into(), entry);
    }
}
