//! Shelfdb Core - Entity catalog, query compilation, and mutation engine.
//!
//! This crate turns self-contained query and mutation documents into
//! parameterized SQL against a pluggable [`Database`] collaborator.

pub mod catalog;
pub mod db;
pub mod error;
pub mod mutation;
pub mod query;

pub use catalog::{
    BridgeDef, EntityDef, FieldDef, FieldKind, Registry, RegistryBuilder, RelationDef,
};
pub use db::Database;
pub use error::Error;
pub use mutation::{parse_batch, parse_request, validate_batch, ColumnValue, MutationEngine};
pub use query::{decompose, QueryExecutor, SqlFragment, MAX_LIMIT};

/// Re-export wire types.
pub use shelfdb_proto as proto;
