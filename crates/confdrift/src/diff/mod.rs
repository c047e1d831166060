//! Diff computation — per-record field walk and batch pairing.
//!
//! The walk visits `current`'s keys only: a key that disappeared entirely is
//! represented by its absence from `current`'s own tree (consistent with
//! null pruning), not enumerated separately. Composite sub-documents recurse
//! into nested nodes so one changed leaf does not drown out its unchanged
//! siblings.

mod node;

pub use node::{DiffEntry, DiffNode};

use serde_json::{Map, Value};
use tracing::warn;

use crate::canon;
use crate::collate;
use crate::dialect::Snapshot;
use crate::error::{CollationError, ItemError, RejectedItem};
use crate::policy::Policy;
use crate::record::CanonicalRecord;

/// Whether the walk is at a record's top level or inside a composite
/// sub-document. Top-level fields flatten unless named composite; inside a
/// composite, any object/object pair recurses so a nested change renders as
/// its own titled group.
#[derive(Clone, Copy, PartialEq)]
enum Scope {
    TopLevel,
    InComposite,
}

/// Diff two canonical records for the same identity key.
///
/// Empty result iff the records are collation-equal.
pub fn diff_records(
    previous: &CanonicalRecord,
    current: &CanonicalRecord,
    policy: &Policy,
) -> Result<DiffNode, CollationError> {
    diff_maps(previous.fields(), current.fields(), Scope::TopLevel, policy)
}

fn diff_maps(
    previous: &Map<String, Value>,
    current: &Map<String, Value>,
    scope: Scope,
    policy: &Policy,
) -> Result<DiffNode, CollationError> {
    let limit = policy.max_collation_depth;
    let mut node = DiffNode::default();

    for (key, cur_value) in current {
        let prev_value = previous.get(key);
        if prev_value == Some(cur_value) {
            continue;
        }

        let composite_pair = match (scope, prev_value, cur_value) {
            (Scope::TopLevel, Some(Value::Object(prev)), Value::Object(cur))
                if policy.is_composite(key) =>
            {
                Some((prev, cur))
            }
            (Scope::InComposite, Some(Value::Object(prev)), Value::Object(cur)) => {
                Some((prev, cur))
            }
            _ => None,
        };

        match composite_pair {
            Some((prev_obj, cur_obj)) => {
                // Raw encodings differ; re-check under collation equality
                // before concluding a real change exists.
                if eq_maps_unordered(prev_obj, cur_obj, limit)? {
                    continue;
                }
                let nested = diff_maps(prev_obj, cur_obj, Scope::InComposite, policy)?;
                // The nested node can be empty when the only change is a
                // deletion; the entry is still recorded so the change is
                // not silently dropped.
                node.insert(key.clone(), DiffEntry::Nested(nested));
            }
            None => {
                if let Some(prev) = prev_value {
                    if collate::eq_unordered(prev, cur_value, limit)? {
                        continue;
                    }
                }
                node.insert(
                    key.clone(),
                    DiffEntry::Previous(prev_value.cloned().unwrap_or(Value::Null)),
                );
            }
        }
    }

    Ok(node)
}

fn eq_maps_unordered(
    a: &Map<String, Value>,
    b: &Map<String, Value>,
    limit: usize,
) -> Result<bool, CollationError> {
    collate::eq_unordered(
        &Value::Object(a.clone()),
        &Value::Object(b.clone()),
        limit,
    )
}

/// One live record carried into the report, with its diff against the
/// snapshot. `diff` is `None` for a wholly new item (no snapshot
/// counterpart).
#[derive(Debug)]
pub struct DiffedItem {
    pub record: CanonicalRecord,
    pub diff: Option<DiffNode>,
}

impl DiffedItem {
    pub fn is_new(&self) -> bool {
        self.diff.is_none()
    }
}

/// The outcome of one comparison pass over a batch of live items.
#[derive(Debug)]
pub struct DiffBatch {
    /// Changed and new items, in input order. Unchanged items are dropped.
    pub items: Vec<DiffedItem>,
    /// Items that failed canonicalization or comparison, with positions.
    pub rejected: Vec<RejectedItem>,
    /// Opaque handle of the snapshot object compared against.
    pub reference: Option<String>,
}

/// Canonicalize a batch of raw live-dialect items and diff each against its
/// snapshot counterpart.
///
/// Items pair by identity key. One item's failure never disturbs its
/// siblings, and report order follows input order.
pub fn diff_batch(current: Vec<Value>, snapshot: &Snapshot, policy: &Policy) -> DiffBatch {
    let mut items = Vec::new();
    let mut rejected = Vec::new();

    for (index, raw) in current.into_iter().enumerate() {
        let record = match canonicalize_live_item(raw, policy) {
            Ok(record) => record,
            Err(error) => {
                warn!(index, %error, "skipping live item");
                rejected.push(RejectedItem {
                    index,
                    identity: None,
                    error,
                });
                continue;
            }
        };

        match snapshot.find(&record.key()) {
            None => items.push(DiffedItem { record, diff: None }),
            Some(previous) => match diff_records(previous, &record, policy) {
                Ok(node) if node.is_empty() => {}
                Ok(node) => items.push(DiffedItem {
                    record,
                    diff: Some(node),
                }),
                Err(error) => {
                    let identity = record.key();
                    warn!(index, %identity, %error, "comparison indeterminate, skipping item");
                    rejected.push(RejectedItem {
                        index,
                        identity: Some(identity),
                        error: ItemError::Collation(error),
                    });
                }
            },
        }
    }

    DiffBatch {
        items,
        rejected,
        reference: snapshot.reference().map(str::to_owned),
    }
}

fn canonicalize_live_item(raw: Value, policy: &Policy) -> Result<CanonicalRecord, ItemError> {
    if !raw.is_object() {
        return Err(ItemError::NotAnObject);
    }
    let canonical = canon::canonicalize(raw, policy)?;
    let Value::Object(fields) = canonical else {
        // canonicalize preserves the outermost object shape
        return Err(ItemError::NotAnObject);
    };
    CanonicalRecord::from_fields(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::normalize;
    use serde_json::json;

    fn record(value: Value) -> CanonicalRecord {
        canonicalize_live_item(value, &Policy::default()).unwrap()
    }

    fn diff(previous: Value, current: Value) -> DiffNode {
        diff_records(&record(previous), &record(current), &Policy::default()).unwrap()
    }

    fn base() -> Value {
        json!({
            "resourceId": "i-1",
            "resourceType": "AWS::EC2::Instance",
        })
    }

    fn with(mut value: Value, key: &str, field: Value) -> Value {
        value
            .as_object_mut()
            .expect("object fixture")
            .insert(key.to_owned(), field);
        value
    }

    #[test]
    fn identical_records_empty_diff() {
        let node = diff(base(), base());
        assert!(node.is_empty());
    }

    #[test]
    fn scalar_change_records_previous_value() {
        let prev = with(base(), "resourceName", json!("oldName1"));
        let cur = with(base(), "resourceName", json!("testName1"));
        let node = diff(prev, cur);
        assert_eq!(node.len(), 1);
        assert_eq!(
            node.get("resourceName"),
            Some(&DiffEntry::Previous(json!("oldName1")))
        );
    }

    #[test]
    fn new_key_records_null_previous() {
        let cur = with(base(), "version", json!("2"));
        let node = diff(base(), cur);
        assert_eq!(node.get("version"), Some(&DiffEntry::Previous(Value::Null)));
    }

    #[test]
    fn reordered_relationships_is_no_change() {
        let rels_a = json!([
            {"resourceId": "vpc-1", "resourceType": "AWS::EC2::VPC", "relationshipName": "contained in"},
            {"resourceId": "sg-1", "resourceType": "AWS::EC2::SecurityGroup", "relationshipName": "associated with"},
            {"resourceId": "sub-1", "resourceType": "AWS::EC2::Subnet", "relationshipName": "contained in"},
        ]);
        let rels_b = json!([
            {"resourceId": "sub-1", "resourceType": "AWS::EC2::Subnet", "relationshipName": "contained in"},
            {"resourceId": "vpc-1", "resourceType": "AWS::EC2::VPC", "relationshipName": "contained in"},
            {"resourceId": "sg-1", "resourceType": "AWS::EC2::SecurityGroup", "relationshipName": "associated with"},
        ]);
        let node = diff(
            with(base(), "relationships", rels_a),
            with(base(), "relationships", rels_b),
        );
        assert!(node.is_empty());
    }

    #[test]
    fn duplicated_element_is_a_change() {
        let node = diff(
            with(base(), "relatedEvents", json!(["e1", "e2"])),
            with(base(), "relatedEvents", json!(["e1", "e1", "e2"])),
        );
        assert!(!node.is_empty());
    }

    #[test]
    fn composite_change_recurses() {
        let prev = with(
            base(),
            "configuration",
            json!({"instanceType": "t2.micro", "state": "running"}),
        );
        let cur = with(
            base(),
            "configuration",
            json!({"instanceType": "t3.large", "state": "running"}),
        );
        let node = diff(prev, cur);
        let Some(DiffEntry::Nested(nested)) = node.get("configuration") else {
            panic!("expected nested diff for configuration");
        };
        assert_eq!(nested.len(), 1);
        assert_eq!(
            nested.get("instanceType"),
            Some(&DiffEntry::Previous(json!("t2.micro")))
        );
    }

    #[test]
    fn object_inside_composite_recurses_again() {
        let prev = with(
            base(),
            "supplementaryConfiguration",
            json!({"BucketVersioning": {"status": "Off", "mfaDelete": "Disabled"}}),
        );
        let cur = with(
            base(),
            "supplementaryConfiguration",
            json!({"BucketVersioning": {"status": "Enabled", "mfaDelete": "Disabled"}}),
        );
        let node = diff(prev, cur);
        let Some(DiffEntry::Nested(outer)) = node.get("supplementaryConfiguration") else {
            panic!("expected nested diff");
        };
        let Some(DiffEntry::Nested(inner)) = outer.get("BucketVersioning") else {
            panic!("expected nested diff for the changed entry");
        };
        assert_eq!(
            inner.get("status"),
            Some(&DiffEntry::Previous(json!("Off")))
        );
    }

    #[test]
    fn object_outside_composite_flattens() {
        let prev = with(base(), "tags", json!({"env": "dev"}));
        let cur = with(base(), "tags", json!({"env": "prod"}));
        let node = diff(prev, cur);
        assert_eq!(
            node.get("tags"),
            Some(&DiffEntry::Previous(json!({"env": "dev"})))
        );
    }

    #[test]
    fn order_only_composite_difference_absorbed() {
        let prev = with(
            base(),
            "configuration",
            json!({"securityGroups": ["sg-1", "sg-2"]}),
        );
        let cur = with(
            base(),
            "configuration",
            json!({"securityGroups": ["sg-2", "sg-1"]}),
        );
        // Arrays sort during canonicalization, so this is equal before the
        // field walk even begins.
        let node = diff(prev, cur);
        assert!(node.is_empty());
    }

    #[test]
    fn deletion_inside_composite_still_flagged() {
        let prev = with(
            base(),
            "configuration",
            json!({"a": 1, "removed": "gone"}),
        );
        let cur = with(base(), "configuration", json!({"a": 1}));
        let node = diff(prev, cur);
        let Some(DiffEntry::Nested(nested)) = node.get("configuration") else {
            panic!("expected nested diff");
        };
        // Unequal blobs, but the walk sees only current's keys.
        assert!(nested.is_empty());
    }

    fn snapshot_for(items: Value) -> Snapshot {
        let raw = json!({"configurationItems": items}).to_string();
        normalize(raw.as_bytes(), &Policy::default()).unwrap()
    }

    #[test]
    fn batch_pairs_news_changes_and_drops_unchanged() {
        let snapshot = snapshot_for(json!([
            {"resourceId": "i-1", "resourceType": "T", "resourceName": "same"},
            {"resourceId": "i-2", "resourceType": "T", "resourceName": "old"},
        ]));
        let current = vec![
            json!({"resourceId": "i-1", "resourceType": "T", "resourceName": "same"}),
            json!({"resourceId": "i-2", "resourceType": "T", "resourceName": "new"}),
            json!({"resourceId": "i-3", "resourceType": "T"}),
        ];
        let batch = diff_batch(current, &snapshot, &Policy::default());
        assert_eq!(batch.items.len(), 2);
        assert_eq!(batch.items[0].record.resource_id(), "i-2");
        assert!(!batch.items[0].is_new());
        assert_eq!(batch.items[1].record.resource_id(), "i-3");
        assert!(batch.items[1].is_new());
        assert!(batch.rejected.is_empty());
    }

    #[test]
    fn batch_isolates_bad_items() {
        let snapshot = snapshot_for(json!([]));
        let current = vec![
            json!({"resourceId": "i-1", "resourceType": "T", "configuration": "{broken"}),
            json!({"resourceId": "i-2", "resourceType": "T"}),
        ];
        let batch = diff_batch(current, &snapshot, &Policy::default());
        assert_eq!(batch.items.len(), 1);
        assert_eq!(batch.items[0].record.resource_id(), "i-2");
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].index, 0);
    }

    #[test]
    fn batch_carries_snapshot_reference() {
        let snapshot = snapshot_for(json!([])).with_reference("ss-key.json");
        let batch = diff_batch(vec![], &snapshot, &Policy::default());
        assert_eq!(batch.reference.as_deref(), Some("ss-key.json"));
    }
}
