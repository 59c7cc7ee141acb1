//! SQL fragment rendering.
//!
//! A fragment is one joined table plus its filters, pagination, and an
//! optional join child; the decomposer builds a chain of them and this
//! module renders the chain into parameterized SQL. Rendering emits
//! anonymous `?` markers and finalizes them into ordinal `$n` placeholders
//! in a single left-to-right pass, so the argument list is collected in
//! exactly the order the markers appear in the finished text.

use super::where_clause::{Comparison, WhereClause};
use crate::catalog::EntityDef;
use shelfdb_proto::Value;
use std::sync::Arc;

/// Hard cap on row-query limits; out-of-range limits are clamped here.
pub const MAX_LIMIT: i64 = 200;

/// One node of a join tree.
#[derive(Debug, Clone, Default)]
pub struct SqlFragment {
    /// Storage table.
    pub table: String,
    /// Table alias, unique within one compilation.
    pub alias: String,
    /// Filter predicates on this table.
    pub where_clauses: Vec<WhereClause>,
    /// Row limit; values outside `[1, MAX_LIMIT]` clamp to `MAX_LIMIT`.
    /// Only meaningful on the outermost fragment.
    pub limit: i64,
    /// Row offset. Only meaningful on the outermost fragment.
    pub offset: i64,
    /// Order expression, emitted verbatim when set.
    /// TODO: validate the expression against the target entity's fields.
    pub order: Option<String>,
    /// Joined child fragment.
    pub join: Option<Box<SqlFragment>>,
    /// Column-equality pairs `(self_column, child_column)` for the ON
    /// condition against `join`.
    pub on: Vec<(String, String)>,
    /// Entity the fragment selects, when built by the decomposer.
    pub target: Option<Arc<EntityDef>>,
}

impl SqlFragment {
    /// Create a bare fragment for a table and alias.
    pub fn new(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: alias.into(),
            ..Self::default()
        }
    }

    /// Attach `child` as this fragment's join child, equating
    /// `self.self_column` with `child.child_column`.
    pub fn join_on(
        &mut self,
        child: SqlFragment,
        self_column: impl Into<String>,
        child_column: impl Into<String>,
    ) {
        self.join = Some(Box::new(child));
        self.on.push((self_column.into(), child_column.into()));
    }

    /// Render the row query.
    pub fn row_sql(&self) -> (String, Vec<Value>) {
        let (join_text, join_args) = self.join_sql();
        let (where_text, where_args) = self.where_sql();

        let limit = if self.limit < 1 || self.limit > MAX_LIMIT {
            MAX_LIMIT
        } else {
            self.limit
        };

        let order_text = match &self.order {
            Some(order) => format!(" ORDER BY {order}"),
            None => String::new(),
        };

        let sql = format!(
            "SELECT {alias}.* FROM {table} AS {alias}{join_text}{where_text}{order_text} LIMIT {limit} OFFSET {offset}",
            alias = self.alias,
            table = self.table,
            offset = self.offset,
        );

        // Join text precedes where text, so join args come first.
        let mut args = join_args;
        args.extend(where_args);

        (number_placeholders(&sql), args)
    }

    /// Render the count query: same WHERE/JOIN shape, no pagination or
    /// ordering.
    pub fn count_sql(&self) -> (String, Vec<Value>) {
        let (join_text, join_args) = self.join_sql();
        let (where_text, where_args) = self.where_sql();

        let sql = format!(
            "SELECT COUNT(*) FROM {table} AS {alias}{join_text}{where_text}",
            alias = self.alias,
            table = self.table,
        );

        let mut args = join_args;
        args.extend(where_args);

        (number_placeholders(&sql), args)
    }

    fn where_sql(&self) -> (String, Vec<Value>) {
        let (bits, args) = self.raw_where_sql("");

        if bits.is_empty() {
            return (String::new(), args);
        }

        (format!(" WHERE {}", bits.join(" AND ")), args)
    }

    /// Render this fragment's own predicates, column names prefixed with
    /// `prefix`, as (`bits`, `args`) with args in text order.
    fn raw_where_sql(&self, prefix: &str) -> (Vec<String>, Vec<Value>) {
        let mut bits = Vec::new();
        let mut args = Vec::new();

        for clause in &self.where_clauses {
            // A list value always means membership; `#primary : [a, b]`
            // arrives this way regardless of the parsed operand.
            if let Value::List(items) = &clause.value {
                if items.is_empty() {
                    bits.push("0 = 1".to_string());
                } else {
                    let markers = vec!["?"; items.len()].join(", ");
                    bits.push(format!("{prefix}{} IN ({markers})", clause.column));
                    args.extend(items.iter().cloned());
                }
                continue;
            }

            match clause.comparison {
                Comparison::IsNull => bits.push(format!("{prefix}{} IS NULL", clause.column)),
                Comparison::IsNotNull => {
                    bits.push(format!("{prefix}{} IS NOT NULL", clause.column));
                }
                comparison => {
                    let op = match comparison {
                        Comparison::Equal => "=",
                        Comparison::NotEqual => "!=",
                        Comparison::Greater => ">",
                        Comparison::GreaterEqual => ">=",
                        Comparison::Less => "<",
                        Comparison::LessEqual => "<=",
                        Comparison::IsNull | Comparison::IsNotNull => unreachable!(),
                    };
                    bits.push(format!("{prefix}{} {op} ?", clause.column));
                    args.push(clause.value.clone());
                }
            }
        }

        (bits, args)
    }

    /// Render the join chain hanging off this fragment.
    ///
    /// A child's own predicates render inside the immediately enclosing
    /// join's ON clause, prefixed with the child's alias. Arguments are
    /// threaded through every nesting level in text order.
    fn join_sql(&self) -> (String, Vec<Value>) {
        let Some(child) = &self.join else {
            return (String::new(), Vec::new());
        };

        let mut on_bits: Vec<String> = self
            .on
            .iter()
            .map(|(mine, theirs)| {
                format!("{}.{} = {}.{}", self.alias, mine, child.alias, theirs)
            })
            .collect();

        let (child_bits, mut args) = child.raw_where_sql(&format!("{}.", child.alias));
        on_bits.extend(child_bits);

        let on_clause = if on_bits.is_empty() {
            String::new()
        } else {
            format!("ON {}", on_bits.join(" AND "))
        };

        let mut text = format!(" INNER JOIN {} {} {}", child.table, child.alias, on_clause);

        if child.join.is_some() {
            let (nested_text, nested_args) = child.join_sql();
            text.push_str(&nested_text);
            args.extend(nested_args);
        }

        (text, args)
    }
}

/// Replace each anonymous `?` marker with an ascending `$n` placeholder.
pub(crate) fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut seen = 1;

    for c in sql.chars() {
        if c == '?' {
            out.push('$');
            out.push_str(&seen.to_string());
            seen += 1;
        } else {
            out.push(c);
        }
    }

    out
}
