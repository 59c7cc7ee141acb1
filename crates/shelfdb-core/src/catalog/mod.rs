//! Entity metadata: fields, relations, and the process-wide registry.

mod entity;
mod field;
mod registry;
mod relation;

pub use entity::EntityDef;
pub use field::{FieldDef, FieldKind};
pub use registry::{Registry, RegistryBuilder};
pub use relation::{BridgeDef, RelationDef};
