//! Mutation validation and value coercion.
//!
//! Wire values arrive in JSON's lexical space, which is looser than the
//! declared field kinds. Validation resolves each field against the
//! entity's metadata, coerces what can be coerced, and rejects the rest
//! field-by-field before anything touches storage.

use crate::catalog::{FieldKind, Registry};
use crate::error::Error;
use shelfdb_proto::{Guid, MutationBatch, MutationRequest, Value};
use std::collections::BTreeSet;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// One storage-ready column assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    /// Storage column name.
    pub column: String,
    /// Coerced value.
    pub value: Value,
}

/// Validate one request against the registry.
///
/// Returns the coerced column assignments in field order. Timestamp fields
/// holding `Null` or an uncoercible value are skipped rather than
/// rejected; the stored row keeps whatever it had.
pub fn validate(request: &MutationRequest, registry: &Registry) -> Result<Vec<ColumnValue>, Error> {
    let entity = registry.lookup(&request.entity)?;

    if request.guid.is_reserved() {
        return Err(Error::InvalidInputField("#primary".to_string()));
    }

    let mut columns = Vec::with_capacity(request.fields.len());

    for (name, value) in &request.fields {
        let Some(field) = entity.field(name) else {
            return Err(Error::InvalidInputField(name.clone()));
        };

        let coerced = match (field.kind, value) {
            (FieldKind::Guid, Value::Null) => Value::Guid(Guid::reserved()),
            (FieldKind::Guid, Value::String(s)) if s.is_empty() => Value::Guid(Guid::reserved()),
            (FieldKind::Guid, Value::String(s)) => Value::Guid(Guid::parse(s)?),
            (FieldKind::Guid, Value::Guid(g)) => Value::Guid(*g),

            (FieldKind::Bool, Value::Bool(b)) => Value::Bool(*b),
            // Numeric booleans invert: zero maps to true. Kept for wire
            // compatibility with existing clients; see DESIGN.md.
            (FieldKind::Bool, Value::Int(n)) => Value::Bool(*n == 0),
            (FieldKind::Bool, Value::Float(f)) => Value::Bool(*f == 0.0),

            (FieldKind::Int, Value::Int(n)) => Value::Int(*n),

            (FieldKind::Float, Value::Float(f)) => Value::Float(*f),
            (FieldKind::Float, Value::Int(n)) => Value::Float(*n as f64),

            (FieldKind::String, Value::String(s)) => Value::String(s.clone()),

            (FieldKind::Timestamp, Value::Timestamp(t)) => Value::Timestamp(*t),
            (FieldKind::Timestamp, Value::Int(n)) => Value::Timestamp(*n),
            (FieldKind::Timestamp, Value::Float(f)) => Value::Timestamp(*f as i64),
            (FieldKind::Timestamp, Value::String(s)) => {
                match coerce_timestamp_string(s) {
                    Some(epoch) => Value::Timestamp(epoch),
                    None => continue,
                }
            }
            (FieldKind::Timestamp, _) => continue,

            _ => return Err(Error::InvalidInputField(name.clone())),
        };

        columns.push(ColumnValue {
            column: field.column.clone(),
            value: coerced,
        });
    }

    Ok(columns)
}

fn coerce_timestamp_string(s: &str) -> Option<i64> {
    if let Ok(when) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(when.unix_timestamp());
    }
    s.parse::<i64>().ok()
}

/// Validate every request of a batch before any of them persists.
///
/// The same identifier appearing twice for the same entity makes the batch
/// ambiguous and rejects it whole.
pub fn validate_batch(
    batch: &MutationBatch,
    registry: &Registry,
) -> Result<Vec<Vec<ColumnValue>>, Error> {
    let mut seen = BTreeSet::new();

    for request in &batch.requests {
        if !seen.insert((request.entity.clone(), request.guid.to_string())) {
            return Err(Error::InvalidInputFormat(
                "duplicate identifier in mutation batch".to_string(),
            ));
        }
    }

    batch
        .requests
        .iter()
        .map(|request| validate(request, registry))
        .collect()
}
