//! Table and column descriptors produced by schema introspection

use serde::{Deserialize, Serialize};

/// One column of a table, as reported by the source catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Declared type, verbatim from the catalog (may be empty)
    pub declared_type: String,
    /// Whether NULL is allowed
    pub nullable: bool,
    /// Default expression, verbatim
    pub default: Option<String>,
    /// Whether the column is part of the primary key
    pub primary_key: bool,
    /// Maximum length for sized character types (`VARCHAR(255)` → 255)
    pub max_length: Option<u32>,
}

impl ColumnDescriptor {
    /// Create a nullable, non-key column; `max_length` is derived from the type
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        let declared_type = declared_type.into();
        let max_length = parse_max_length(&declared_type);
        ColumnDescriptor {
            name: name.into(),
            declared_type,
            nullable: true,
            default: None,
            primary_key: false,
            max_length,
        }
    }

    /// Mark the column NOT NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the column as (part of) the primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Set the default expression
    pub fn with_default(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Whether the declared type names a date or time type
    pub fn is_temporal(&self) -> bool {
        let ty = self.declared_type.to_ascii_uppercase();
        ty.contains("DATE") || ty.contains("TIME")
    }
}

/// A base table and its ordered columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Create a descriptor
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        TableDescriptor {
            name: name.into(),
            columns,
        }
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the primary-key columns
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Extract the first parenthesized length from a declared type
///
/// `VARCHAR(255)` → `Some(255)`, `DECIMAL(10,2)` → `Some(10)`, `TEXT` → `None`.
pub fn parse_max_length(declared_type: &str) -> Option<u32> {
    let open = declared_type.find('(')?;
    let close = declared_type[open..].find(')')? + open;
    let inner = &declared_type[open + 1..close];
    let first = inner.split(',').next()?.trim();
    first.parse().ok()
}
