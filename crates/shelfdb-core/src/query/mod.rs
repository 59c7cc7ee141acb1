//! Query decomposition, SQL rendering, and execution.

mod decompose;
mod executor;
mod fragment;
mod where_clause;

pub use decompose::decompose;
pub use executor::QueryExecutor;
pub use fragment::{SqlFragment, MAX_LIMIT};
pub use where_clause::{desugar, Comparison, WhereClause};

pub(crate) use fragment::number_placeholders;
