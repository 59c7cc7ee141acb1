//! Mutation parsing, validation, and transactional persistence.

mod persist;
mod request;
mod validate;

pub use persist::{upsert_sql, MutationEngine};
pub use request::{parse_batch, parse_request};
pub use validate::{validate, validate_batch, ColumnValue};
