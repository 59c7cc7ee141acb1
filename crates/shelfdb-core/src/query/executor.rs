//! Query execution.
//!
//! Runs every named request of a document against a [`Database`]: a count
//! query first, then the row query only when the count is nonzero. Each
//! named request succeeds or fails on its own; transient requests exist
//! only to be referenced as subgraphs and produce no output of their own.

use super::decompose::decompose;
use crate::catalog::Registry;
use crate::db::Database;
use crate::error::Error;
use shelfdb_proto::{QueryDocument, QueryPart, QueryResponse};
use std::collections::BTreeMap;
use tracing::debug;

/// Executes query documents against a database.
pub struct QueryExecutor<'a, D: Database> {
    db: &'a D,
    registry: &'a Registry,
}

impl<'a, D: Database> QueryExecutor<'a, D> {
    pub fn new(db: &'a D, registry: &'a Registry) -> Self {
        Self { db, registry }
    }

    /// Execute every non-transient request, keyed by request name.
    pub fn execute(&self, document: &QueryDocument) -> BTreeMap<String, Result<QueryPart, Error>> {
        let mut results = BTreeMap::new();

        for (name, request) in document.iter() {
            if request.transient {
                continue;
            }
            results.insert(name.clone(), self.execute_one(document, name));
        }

        results
    }

    /// Execute a document, failing the whole call on the first error.
    pub fn execute_all(&self, document: &QueryDocument) -> Result<QueryResponse, Error> {
        self.execute(document)
            .into_iter()
            .map(|(name, result)| result.map(|part| (name, part)))
            .collect()
    }

    fn execute_one(&self, document: &QueryDocument, name: &str) -> Result<QueryPart, Error> {
        let request = document
            .get(name)
            .ok_or_else(|| Error::InvalidInputFormat(format!("request ({name}) does not exist")))?;

        let frag = decompose(request, document, self.registry)?;
        let model = frag
            .target
            .as_ref()
            .map(|entity| entity.name.clone())
            .unwrap_or_default();

        let (count_sql, count_args) = frag.count_sql();
        debug!(request = name, sql = %count_sql, "counting rows");

        let count_rows = self.db.query(&count_sql, &count_args)?;
        let total = count_rows
            .first()
            .and_then(|row| row.values().next())
            .and_then(|value| value.as_i64())
            .ok_or_else(|| Error::Database("no rows returned for a COUNT(*)".to_string()))?;

        if total == 0 {
            return Ok(QueryPart {
                total: 0,
                slice: Vec::new(),
                model,
            });
        }

        let (row_sql, row_args) = frag.row_sql();
        debug!(request = name, sql = %row_sql, total, "fetching slice");

        let slice = self.db.query(&row_sql, &row_args)?;

        Ok(QueryPart {
            total,
            slice,
            model,
        })
    }
}
