//! Query document types.
//!
//! A query document is a map of named requests. A request either names an
//! entity type directly, or references another named request (a subgraph)
//! and joins against it through a relation. Documents are self-contained:
//! whatever transport carries them, the engine sees the same shape.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A result row: storage column name to value.
pub type Row = BTreeMap<String, Value>;

/// One named retrieval request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    /// Entity type to query. Exactly one of `model` and `subgraph` must be
    /// set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Name of a previously-declared request to join against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subgraph: Option<String>,

    /// Relation name, resolved on the model (inline) or on the subgraph's
    /// entity type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,

    /// Raw filter map; field names may carry a trailing operator token.
    #[serde(rename = "where", skip_serializing_if = "BTreeMap::is_empty")]
    pub where_clauses: BTreeMap<String, Value>,

    /// Order expression, emitted verbatim when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    /// Row limit; clamped to the engine maximum at compile time.
    #[serde(skip_serializing_if = "is_zero")]
    pub limit: i64,

    /// Row offset; defaults to 0.
    #[serde(skip_serializing_if = "is_zero")]
    pub offset: i64,

    /// Transient requests are resolvable as subgraph ancestors but are
    /// never executed or reported themselves.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub transient: bool,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl QueryRequest {
    /// Create a direct request for an entity type.
    pub fn model(name: impl Into<String>) -> Self {
        Self {
            model: Some(name.into()),
            ..Self::default()
        }
    }

    /// Create a subgraph request joining a named request via a relation.
    pub fn subgraph(name: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            subgraph: Some(name.into()),
            relation: Some(relation.into()),
            ..Self::default()
        }
    }

    /// Set the relation to resolve inline on the model.
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    /// Add a raw where clause.
    pub fn with_where(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clauses.insert(field.into(), value.into());
        self
    }

    /// Set the order expression.
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Set the row limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the row offset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Mark the request transient.
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

/// A forest of named requests.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryDocument {
    requests: BTreeMap<String, QueryRequest>,
}

impl QueryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a request under a name; an empty name is auto-assigned
    /// sequentially.
    pub fn insert(&mut self, name: impl Into<String>, request: QueryRequest) -> String {
        let mut name = name.into();
        if name.is_empty() {
            name = format!("___auto_{}", self.requests.len());
        }
        self.requests.insert(name.clone(), request);
        name
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, request: QueryRequest) -> Self {
        self.insert(name, request);
        self
    }

    /// Look up a request by name.
    pub fn get(&self, name: &str) -> Option<&QueryRequest> {
        self.requests.get(name)
    }

    /// Iterate requests in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryRequest)> {
        self.requests.iter()
    }

    /// Number of requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl FromIterator<(String, QueryRequest)> for QueryDocument {
    fn from_iter<T: IntoIterator<Item = (String, QueryRequest)>>(iter: T) -> Self {
        Self {
            requests: iter.into_iter().collect(),
        }
    }
}

/// The result attached to one named request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryPart {
    /// Total matching rows, independent of pagination.
    pub total: i64,
    /// The page of rows, as column-to-value maps; typed marshaling is the
    /// caller's concern.
    pub slice: Vec<Row>,
    /// Resolved entity type name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub model: String,
}

/// Results for a whole document, keyed by request name.
pub type QueryResponse = BTreeMap<String, QueryPart>;
