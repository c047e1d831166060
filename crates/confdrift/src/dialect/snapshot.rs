//! Snapshot envelope loading.

use serde_json::{Map, Value};
use tracing::warn;

use crate::canon;
use crate::error::{ItemError, NormalizeError, RejectedItem};
use crate::policy::Policy;
use crate::record::{CanonicalRecord, ItemKey};

use super::rewrite_item;

/// One point-in-time collection of configuration items, decoded from a
/// single object-store blob and normalized into the canonical dialect.
/// Immutable once loaded.
#[derive(Debug)]
pub struct Snapshot {
    file_version: Option<String>,
    snapshot_id: Option<String>,
    items: Vec<CanonicalRecord>,
    rejected: Vec<RejectedItem>,
    reference: Option<String>,
}

impl Snapshot {
    pub fn file_version(&self) -> Option<&str> {
        self.file_version.as_deref()
    }

    pub fn snapshot_id(&self) -> Option<&str> {
        self.snapshot_id.as_deref()
    }

    pub fn items(&self) -> &[CanonicalRecord] {
        &self.items
    }

    /// Items that failed normalization, with their input positions. Their
    /// siblings are unaffected.
    pub fn rejected(&self) -> &[RejectedItem] {
        &self.rejected
    }

    /// Opaque handle naming the object this snapshot was read from. Carried
    /// into the report header, never interpreted.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Attach the source-object handle.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Find the snapshot item matching an identity key.
    pub fn find(&self, key: &ItemKey) -> Option<&CanonicalRecord> {
        self.items
            .iter()
            .find(|item| item.resource_id() == key.resource_id && item.resource_type() == key.resource_type)
    }
}

/// Load raw snapshot bytes into a [`Snapshot`].
///
/// The bytes must be a JSON object; `configurationItems`, when present, must
/// be an array. Violations of either are a hard [`NormalizeError`] with no
/// partial snapshot. Individual items that fail the rewrite/decode pipeline
/// are set aside as [`RejectedItem`]s without disturbing their siblings.
pub fn normalize(raw: &[u8], policy: &Policy) -> Result<Snapshot, NormalizeError> {
    let root: Value = serde_json::from_slice(raw)?;
    let Value::Object(mut envelope) = root else {
        return Err(NormalizeError::RootShape);
    };

    let file_version = take_string(&mut envelope, "fileVersion");
    let snapshot_id = take_string(&mut envelope, "configSnapshotId");

    let raw_items = match envelope.remove("configurationItems") {
        None => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(NormalizeError::ItemsShape),
    };

    let mut items = Vec::with_capacity(raw_items.len());
    let mut rejected = Vec::new();
    for (index, raw_item) in raw_items.into_iter().enumerate() {
        match normalize_item(raw_item, policy) {
            Ok(record) => items.push(record),
            Err(error) => {
                warn!(index, %error, "skipping snapshot item");
                rejected.push(RejectedItem {
                    index,
                    identity: None,
                    error,
                });
            }
        }
    }

    Ok(Snapshot {
        file_version,
        snapshot_id,
        items,
        rejected,
        reference: None,
    })
}

fn normalize_item(raw: Value, policy: &Policy) -> Result<CanonicalRecord, ItemError> {
    let Value::Object(map) = raw else {
        return Err(ItemError::NotAnObject);
    };
    let rewritten = rewrite_item(map);
    let canonical = canon::canonicalize(Value::Object(rewritten), policy)?;
    let Value::Object(fields) = canonical else {
        // canonicalize preserves the outermost object shape
        return Err(ItemError::NotAnObject);
    };
    CanonicalRecord::from_fields(fields)
}

fn take_string(envelope: &mut Map<String, Value>, key: &str) -> Option<String> {
    match envelope.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}
