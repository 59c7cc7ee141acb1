//! Entity descriptors.

use super::field::FieldDef;
use super::relation::{BridgeDef, RelationDef};
use shelfdb_proto::Guid;

/// Static metadata for one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDef {
    /// Entity type name (unique within the registry).
    pub name: String,
    /// Storage table name.
    pub table: String,
    /// Primary-key column name.
    pub primary_key: String,
    /// Small tag stamped into freshly generated identifiers.
    pub tag: u8,
    /// Concrete field set.
    pub fields: Vec<FieldDef>,
    /// Direct relations, keyed by name.
    pub relations: Vec<RelationDef>,
    /// Bridge (many-to-many) relations, keyed by name.
    pub bridges: Vec<BridgeDef>,
}

impl EntityDef {
    /// Create an entity descriptor.
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            primary_key: primary_key.into(),
            tag: 0,
            fields: Vec::new(),
            relations: Vec::new(),
            bridges: Vec::new(),
        }
    }

    /// Set the identifier tag.
    pub fn with_tag(mut self, tag: u8) -> Self {
        self.tag = tag;
        self
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a direct relation.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    /// Add a bridge relation.
    pub fn with_bridge(mut self, bridge: BridgeDef) -> Self {
        self.bridges.push(bridge);
        self
    }

    /// Get a field by wire name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a direct relation by name.
    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Get a bridge relation by name.
    pub fn bridge(&self, name: &str) -> Option<&BridgeDef> {
        self.bridges.iter().find(|b| b.name == name)
    }

    /// Check whether a relation name resolves, either directly or through
    /// a bridge.
    pub fn relation_exists(&self, name: &str) -> bool {
        self.relation(name).is_some() || self.bridge(name).is_some()
    }

    /// Generate a fresh identifier tagged for this entity type.
    pub fn guid(&self) -> Guid {
        Guid::tagged(self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldKind;

    #[test]
    fn test_entity_builder() {
        let entity = EntityDef::new("Book", "book", "pid")
            .with_tag(2)
            .with_field(FieldDef::new("pid", FieldKind::Guid))
            .with_field(FieldDef::new("title", FieldKind::String))
            .with_relation(RelationDef::new("pages", "pid", "Page", "bookRef"));

        assert_eq!(entity.table, "book");
        assert_eq!(entity.primary_key, "pid");
        assert!(entity.field("title").is_some());
        assert!(entity.field("missing").is_none());
        assert!(entity.relation_exists("pages"));
        assert!(!entity.relation_exists("tags"));
    }

    #[test]
    fn test_tagged_guid() {
        let entity = EntityDef::new("Book", "book", "pid").with_tag(9);
        assert_eq!(entity.guid().as_bytes()[0], 9);
    }
}
