//! The entity metadata registry.
//!
//! Built once at startup, immutable afterwards, and passed by reference
//! into the decomposer and validator. Because it never mutates after
//! [`RegistryBuilder::build`], concurrent reads need no synchronization.

use super::entity::EntityDef;
use crate::error::Error;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-wide entity metadata, looked up by entity type name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: HashMap<String, Arc<EntityDef>>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            entities: Vec::new(),
        }
    }

    /// Look up entity metadata by type name.
    pub fn lookup(&self, name: &str) -> Result<Arc<EntityDef>, Error> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| Error::InvalidInputFormat(format!("model ({name}) does not exist")))
    }

    /// List registered entity type names, unordered.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Builder validating the registered descriptors as a whole.
pub struct RegistryBuilder {
    entities: Vec<EntityDef>,
}

impl RegistryBuilder {
    /// Register an entity descriptor.
    pub fn entity(mut self, entity: EntityDef) -> Self {
        self.entities.push(entity);
        self
    }

    /// Validate cross-references and produce the immutable registry.
    ///
    /// Rejects duplicate entity names, relation names claimed by both a
    /// direct and a bridge relation on the same entity, and relation or
    /// bridge targets naming unknown entities.
    pub fn build(self) -> Result<Registry, Error> {
        let mut entities: HashMap<String, Arc<EntityDef>> = HashMap::new();

        for entity in &self.entities {
            if entities
                .insert(entity.name.clone(), Arc::new(entity.clone()))
                .is_some()
            {
                return Err(Error::InvalidInputFormat(format!(
                    "duplicate entity ({})",
                    entity.name
                )));
            }
        }

        for entity in &self.entities {
            for relation in &entity.relations {
                if entity.bridge(&relation.name).is_some() {
                    return Err(Error::InvalidInputFormat(format!(
                        "relation ({}) on {} is both direct and bridge",
                        relation.name, entity.name
                    )));
                }
                if !entities.contains_key(&relation.target) {
                    return Err(Error::InvalidInputFormat(format!(
                        "relation ({}) on {} targets unknown model ({})",
                        relation.name, entity.name, relation.target
                    )));
                }
            }

            for bridge in &entity.bridges {
                if !entities.contains_key(&bridge.bridge) {
                    return Err(Error::InvalidInputFormat(format!(
                        "bridge relation ({}) on {} uses unknown bridge model ({})",
                        bridge.name, entity.name, bridge.bridge
                    )));
                }
                if !entities.contains_key(&bridge.target) {
                    return Err(Error::InvalidInputFormat(format!(
                        "bridge relation ({}) on {} targets unknown model ({})",
                        bridge.name, entity.name, bridge.target
                    )));
                }
            }
        }

        Ok(Registry { entities })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BridgeDef, FieldDef, FieldKind, RelationDef};

    fn book() -> EntityDef {
        EntityDef::new("Book", "book", "pid")
            .with_field(FieldDef::new("pid", FieldKind::Guid))
            .with_relation(RelationDef::new("pages", "pid", "Page", "bookRef"))
    }

    fn page() -> EntityDef {
        EntityDef::new("Page", "page", "pid")
            .with_field(FieldDef::new("pid", FieldKind::Guid))
            .with_field(FieldDef::new("bookRef", FieldKind::Guid))
    }

    #[test]
    fn test_lookup() {
        let registry = Registry::builder()
            .entity(book())
            .entity(page())
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("Book").unwrap().table, "book");
        assert!(matches!(
            registry.lookup("Nope"),
            Err(Error::InvalidInputFormat(_))
        ));
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let result = Registry::builder().entity(book()).entity(book()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_relation_target_rejected() {
        let result = Registry::builder().entity(book()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_ambiguous_relation_name_rejected() {
        let tag = EntityDef::new("Tag", "tag", "pid")
            .with_relation(RelationDef::new("books", "pid", "Book", "pid"))
            .with_bridge(BridgeDef::new("books", "Bridge", "tag_id", "Book", "book_id"));
        let bridge = EntityDef::new("Bridge", "bridge", "pid");

        let result = Registry::builder()
            .entity(tag)
            .entity(bridge)
            .entity(book())
            .entity(page())
            .build();
        assert!(result.is_err());
    }
}
