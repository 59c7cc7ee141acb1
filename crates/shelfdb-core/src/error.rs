//! Core error types.

use shelfdb_proto::Guid;
use thiserror::Error;

/// Errors surfaced by the query and mutation engines.
#[derive(Debug, Error)]
pub enum Error {
    /// The request shape itself is malformed (unknown entity type or
    /// relation, missing model/subgraph discriminator, cyclic subgraph
    /// reference, non-object mutation envelope).
    #[error("invalid input format: {0}")]
    InvalidInputFormat(String),

    /// A required input field is absent.
    #[error("missing input field: {0}")]
    MissingInputField(String),

    /// A named input field failed validation.
    #[error("invalid input field: {0}")]
    InvalidInputField(String),

    /// A referenced identifier does not exist where one is required.
    #[error("object not found: {0}")]
    ObjectNotFound(Guid),

    /// The external database collaborator failed.
    #[error("database error: {0}")]
    Database(String),

    /// Wire-level error.
    #[error("protocol error: {0}")]
    Proto(#[from] shelfdb_proto::Error),
}
