//! Mutation persistence.
//!
//! Each request persists as one atomic upsert keyed on the entity's
//! primary key, and a batch runs inside a single transaction: either every
//! request lands or none do.

use super::validate::{validate_batch, ColumnValue};
use crate::catalog::{EntityDef, Registry};
use crate::db::Database;
use crate::error::Error;
use crate::query::number_placeholders;
use shelfdb_proto::{MutationBatch, Value};
use tracing::{debug, warn};

/// Render the upsert for one request.
///
/// The identifier is always the first argument; a column assignment that
/// targets the key column itself is dropped since the identifier already
/// supplies it. With no other columns the statement degrades to an
/// insert-if-absent.
pub fn upsert_sql(
    entity: &EntityDef,
    guid_text: &str,
    columns: &[ColumnValue],
) -> (String, Vec<Value>) {
    let mut names = vec![entity.primary_key.clone()];
    let mut args: Vec<Value> = vec![Value::String(guid_text.to_string())];

    for column in columns {
        if column.column == entity.primary_key {
            continue;
        }
        names.push(column.column.clone());
        args.push(column.value.clone());
    }

    let markers = vec!["?"; names.len()].join(", ");
    let conflict = if names.len() == 1 {
        "DO NOTHING".to_string()
    } else {
        let assignments: Vec<String> = names[1..]
            .iter()
            .map(|name| format!("{name} = excluded.{name}"))
            .collect();
        format!("DO UPDATE SET {}", assignments.join(", "))
    };

    let sql = format!(
        "INSERT INTO {table} ({names}) VALUES ({markers}) ON CONFLICT ({key}) {conflict}",
        table = entity.table,
        names = names.join(", "),
        key = entity.primary_key,
    );

    (number_placeholders(&sql), args)
}

/// Applies mutation batches to a database.
pub struct MutationEngine<'a, D: Database> {
    db: &'a D,
    registry: &'a Registry,
}

impl<'a, D: Database> MutationEngine<'a, D> {
    pub fn new(db: &'a D, registry: &'a Registry) -> Self {
        Self { db, registry }
    }

    /// Validate and persist a whole batch transactionally.
    ///
    /// Validation runs for every request before the transaction opens.
    /// Delete-flagged requests and requests whose every field was skipped
    /// persist nothing.
    pub fn apply(&self, batch: &MutationBatch) -> Result<(), Error> {
        let validated = validate_batch(batch, self.registry)?;

        self.db.begin()?;

        for (request, columns) in batch.requests.iter().zip(&validated) {
            if request.delete || columns.is_empty() {
                continue;
            }

            let entity = self.registry.lookup(&request.entity)?;
            let (sql, args) = upsert_sql(&entity, &request.guid.to_string(), columns);
            debug!(entity = %request.entity, guid = %request.guid, sql = %sql, "persisting");

            if let Err(er) = self.db.execute(&sql, &args) {
                warn!(entity = %request.entity, guid = %request.guid, error = %er, "rolling back batch");
                self.db.rollback()?;
                return Err(er);
            }
        }

        self.db.commit()
    }
}
