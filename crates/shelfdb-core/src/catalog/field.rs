//! Field descriptors.

/// The declared value type of a field.
///
/// Mutation validation dispatches its coercions on this tag; the closed
/// set replaces runtime type introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 16-byte identifier, string form on the wire.
    Guid,
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// UTF-8 string.
    String,
    /// Seconds since the Unix epoch.
    Timestamp,
}

/// A field of an entity: wire name, storage column, and declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Wire-facing field name.
    pub name: String,
    /// Storage column name.
    pub column: String,
    /// Declared value type.
    pub kind: FieldKind,
}

impl FieldDef {
    /// Create a field whose storage column matches its wire name.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            kind,
        }
    }

    /// Override the storage column name.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}
