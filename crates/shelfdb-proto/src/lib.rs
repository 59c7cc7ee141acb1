//! Shelfdb wire documents.
//!
//! Identifier and value primitives plus the self-contained query and
//! mutation document types exchanged with the engine. Nothing here knows
//! about entity metadata or SQL; that lives in `shelfdb-core`.

mod error;
mod guid;
mod mutation;
mod query;
mod value;

pub use error::Error;
pub use guid::{Guid, RESERVED_GUID_STR};
pub use mutation::{MutationBatch, MutationRequest};
pub use query::{QueryDocument, QueryPart, QueryRequest, QueryResponse, Row};
pub use value::Value;
