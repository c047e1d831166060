//! The canonical record type and its identity key.

use serde_json::{Map, Value};

use crate::error::ItemError;

/// Identity of a configuration item within one comparison pass.
///
/// Not globally unique across time; the pairing between live items and
/// snapshot items only holds inside a single batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub resource_id: String,
    pub resource_type: String,
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.resource_id)
    }
}

/// A fully decoded, dialect-normalized configuration item.
///
/// All embedded string-encoded JSON has been resolved, arrays are in stable
/// collation order, and null leaves are pruned (outside the raw-shape
/// exemption). Field names are the live-API camelCase names.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    fields: Map<String, Value>,
}

impl CanonicalRecord {
    /// Wrap an already-canonicalized object, validating the identity fields.
    pub(crate) fn from_fields(fields: Map<String, Value>) -> Result<Self, ItemError> {
        require_str(&fields, "resourceId")?;
        require_str(&fields, "resourceType")?;
        Ok(Self { fields })
    }

    pub fn key(&self) -> ItemKey {
        ItemKey {
            resource_id: self.resource_id().to_owned(),
            resource_type: self.resource_type().to_owned(),
        }
    }

    pub fn resource_id(&self) -> &str {
        str_field(&self.fields, "resourceId")
    }

    pub fn resource_type(&self) -> &str {
        str_field(&self.fields, "resourceType")
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.fields.get("resourceName").and_then(Value::as_str)
    }

    pub fn account_id(&self) -> Option<&str> {
        self.fields.get("accountId").and_then(Value::as_str)
    }

    /// Friendly name for report headers: the resource name when present and
    /// non-empty, the resource id otherwise.
    pub fn display_name(&self) -> &str {
        match self.resource_name() {
            Some(name) if !name.is_empty() => name,
            _ => self.resource_id(),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

fn require_str(fields: &Map<String, Value>, field: &'static str) -> Result<(), ItemError> {
    match fields.get(field) {
        None => Err(ItemError::MissingField(field)),
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(ItemError::FieldShape {
            field,
            expected: "string",
        }),
    }
}

fn str_field<'a>(fields: &'a Map<String, Value>, field: &str) -> &'a str {
    // Validated in from_fields; absent only if the map was mutated, which
    // the type prevents.
    fields.get(field).and_then(Value::as_str).unwrap_or("")
}
