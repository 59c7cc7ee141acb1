//! The external database-access collaborator interface.
//!
//! Both engines compile to parameterized SQL and hand it to an
//! implementation of [`Database`]. Connection pooling, retries, and
//! timeouts are the implementation's concern, not the engines'.

use crate::error::Error;
use shelfdb_proto::Value;

pub use shelfdb_proto::Row;

/// A SQL execution backend.
///
/// `sql` uses ordinal `$1, $2, …` placeholders; `args` is in placeholder
/// order. Transaction methods bracket a mutation batch; implementations
/// backed by an auto-commit connection may treat them as no-ops at the
/// cost of batch atomicity.
pub trait Database {
    /// Run a row-returning statement.
    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>, Error>;

    /// Run a non-returning statement; returns the affected row count.
    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, Error>;

    /// Open a transaction.
    fn begin(&self) -> Result<(), Error>;

    /// Commit the open transaction.
    fn commit(&self) -> Result<(), Error>;

    /// Roll back the open transaction.
    fn rollback(&self) -> Result<(), Error>;
}
