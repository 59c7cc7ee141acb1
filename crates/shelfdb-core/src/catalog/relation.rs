//! Relation descriptors between entities.

/// A direct relation: `target.target_column = self.self_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    /// Relation name, unique among the owning entity's relations and
    /// bridges.
    pub name: String,
    /// Join column on the owning entity.
    pub self_column: String,
    /// Target entity type name.
    pub target: String,
    /// Join column on the target entity.
    pub target_column: String,
}

impl RelationDef {
    /// Create a direct relation.
    pub fn new(
        name: impl Into<String>,
        self_column: impl Into<String>,
        target: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            self_column: self_column.into(),
            target: target.into(),
            target_column: target_column.into(),
        }
    }
}

/// A many-to-many relation mediated by a bridge table:
/// `bridge.bridge_to_self = self.primary_key` and
/// `target.primary_key = bridge.bridge_to_target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeDef {
    /// Relation name, unique among the owning entity's relations and
    /// bridges.
    pub name: String,
    /// Bridge entity type name.
    pub bridge: String,
    /// Column on the bridge referencing the owning entity.
    pub bridge_to_self: String,
    /// Target entity type name.
    pub target: String,
    /// Column on the bridge referencing the target entity.
    pub bridge_to_target: String,
}

impl BridgeDef {
    /// Create a bridge relation.
    pub fn new(
        name: impl Into<String>,
        bridge: impl Into<String>,
        bridge_to_self: impl Into<String>,
        target: impl Into<String>,
        bridge_to_target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bridge: bridge.into(),
            bridge_to_self: bridge_to_self.into(),
            target: target.into(),
            bridge_to_target: bridge_to_target.into(),
        }
    }
}
