//! Mutation document types.
//!
//! A mutation batch is a sequence of field-level edits, one entity each.
//! On the wire a request is a flat JSON object: keys prefixed with `#`
//! carry metadata (`#model`, `#primary`, `#delete`) and every other key is
//! a field value. Parsing the wire form needs entity metadata to resolve
//! the primary key, so it lives in the core crate next to the registry;
//! this module owns the in-memory shape and the serialized form.

use crate::guid::Guid;
use crate::value::Value;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// One field-level edit of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    /// Entity type name.
    pub entity: String,
    /// Primary identifier; must be pre-populated and non-reserved.
    pub guid: Guid,
    /// Delete flag; delete requests carry no field values on the wire.
    pub delete: bool,
    /// Field name to raw value.
    pub fields: BTreeMap<String, Value>,
}

impl MutationRequest {
    /// Create a new mutation for an entity instance.
    pub fn new(entity: impl Into<String>, guid: Guid) -> Self {
        Self {
            entity: entity.into(),
            guid,
            delete: false,
            fields: BTreeMap::new(),
        }
    }

    /// Set a field value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Mark the request as a delete.
    pub fn delete(mut self) -> Self {
        self.delete = true;
        self
    }
}

impl Serialize for MutationRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let field_count = if self.delete { 0 } else { self.fields.len() };
        let mut map = serializer.serialize_map(Some(2 + field_count + usize::from(self.delete)))?;

        map.serialize_entry("#model", &self.entity)?;
        map.serialize_entry("#primary", &self.guid)?;

        if self.delete {
            // Field data is withheld on deletes so the server never
            // validates relation fields against rows that are going away.
            map.serialize_entry("#delete", &true)?;
        } else {
            for (name, value) in &self.fields {
                map.serialize_entry(name, value)?;
            }
        }

        map.end()
    }
}

/// An ordered batch of mutation requests sharing one envelope.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct MutationBatch {
    /// Requests in submission order.
    pub requests: Vec<MutationRequest>,
}

impl MutationBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request to the batch.
    pub fn push(&mut self, request: MutationRequest) {
        self.requests.push(request);
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Number of requests in the batch.
    pub fn len(&self) -> usize {
        self.requests.len()
    }
}

impl FromIterator<MutationRequest> for MutationBatch {
    fn from_iter<T: IntoIterator<Item = MutationRequest>>(iter: T) -> Self {
        Self {
            requests: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guid() -> Guid {
        Guid::parse("0123456789ABCDEF0123456789ABCDEF").unwrap()
    }

    #[test]
    fn test_wire_form() {
        let request = MutationRequest::new("Tag", guid()).with_field("name", "cat");
        let json: serde_json::Value = serde_json::to_value(&request).unwrap();

        assert_eq!(json["#model"], "Tag");
        assert_eq!(json["#primary"], "0123456789ABCDEF0123456789ABCDEF");
        assert_eq!(json["name"], "cat");
        assert!(json.get("#delete").is_none());
    }

    #[test]
    fn test_delete_withholds_fields() {
        let request = MutationRequest::new("Tag", guid())
            .with_field("name", "cat")
            .delete();
        let json: serde_json::Value = serde_json::to_value(&request).unwrap();

        assert_eq!(json["#delete"], true);
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_batch_collects() {
        let batch: MutationBatch = (0..3)
            .map(|i| MutationRequest::new("Tag", guid()).with_field("name", format!("t{i}")))
            .collect();

        assert_eq!(batch.len(), 3);
        assert!(!batch.is_empty());
    }
}
