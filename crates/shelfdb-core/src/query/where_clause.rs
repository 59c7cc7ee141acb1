//! Where-clause desugaring.
//!
//! Wire filters arrive as a loose field-to-value map where a field name
//! may carry a trailing operator token (`"age >="`). Desugaring strips the
//! token once and produces typed clauses; no type checking happens here.

use crate::catalog::EntityDef;
use shelfdb_proto::Value;
use std::collections::BTreeMap;

/// Comparison operand of a where clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `=`; with a list value this becomes membership (IN).
    Equal,
    /// `!=`.
    NotEqual,
    /// `>`.
    Greater,
    /// `>=`.
    GreaterEqual,
    /// `<`.
    Less,
    /// `<=`.
    LessEqual,
    /// `IS NULL`; takes no argument.
    IsNull,
    /// `IS NOT NULL`; takes no argument.
    IsNotNull,
}

impl Comparison {
    /// Map a trailing operator token; unknown tokens silently mean
    /// equality.
    fn from_token(token: &str) -> Self {
        match token {
            ">" => Comparison::Greater,
            ">=" => Comparison::GreaterEqual,
            "<" => Comparison::Less,
            "<=" => Comparison::LessEqual,
            "=" | "==" => Comparison::Equal,
            "!=" => Comparison::NotEqual,
            "NULL" => Comparison::IsNull,
            "NOTNULL" => Comparison::IsNotNull,
            _ => Comparison::Equal,
        }
    }
}

/// One typed filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// Column the predicate applies to.
    pub column: String,
    /// Comparison operand.
    pub comparison: Comparison,
    /// Comparison value; a list means equality-membership.
    pub value: Value,
}

/// Desugar a raw filter map against an entity's metadata.
///
/// The `#primary` pseudo-field is rewritten to the entity's primary-key
/// column (overwriting any clause already present for it).
pub fn desugar(clauses: &BTreeMap<String, Value>, entity: &EntityDef) -> Vec<WhereClause> {
    let mut clauses = clauses.clone();
    if let Some(value) = clauses.remove("#primary") {
        clauses.insert(entity.primary_key.clone(), value);
    }

    clauses
        .into_iter()
        .map(|(field, value)| {
            let mut parts = field.split_whitespace();
            let column = parts.next().unwrap_or_default().to_string();
            let comparison = match parts.last() {
                Some(token) => Comparison::from_token(token),
                None => Comparison::Equal,
            };

            WhereClause {
                column,
                comparison,
                value,
            }
        })
        .collect()
}
