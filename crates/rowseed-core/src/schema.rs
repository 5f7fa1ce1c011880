use std::fmt;

use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Serialize};

use crate::DEFAULT_SCHEMA;
use crate::types::ColumnKind;

/// Possibly schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Parse `schema.table` or `table`.
    pub fn parse(value: &str) -> Self {
        match value.trim().split_once('.') {
            Some((schema, name)) => Self::new(Some(schema.trim()), name.trim()),
            None => Self::new(None, value.trim()),
        }
    }

    /// Schema name, falling back to `public`.
    pub fn schema_or_default(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// Fully-qualified key used for catalog lookups.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema_or_default(), self.name)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

// Plans spell tables as `"schema.table"` strings, so the schema must too.
impl JsonSchema for TableRef {
    fn schema_name() -> String {
        "TableRef".to_string()
    }

    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

impl From<String> for TableRef {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for TableRef {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<TableRef> for String {
    fn from(value: TableRef) -> Self {
        value.to_string()
    }
}

/// Column metadata as reported by the schema catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
    /// Declared SQL type, kept for diagnostics.
    pub sql_type: String,
    /// Storage size: byte width for integers, character limit for text.
    pub limit: Option<u32>,
    pub nullable: bool,
    pub has_default: bool,
    /// Identity or generated columns are never written by the loader.
    pub generated: bool,
}

impl ColumnSpec {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Self {
            name: name.to_string(),
            sql_type: kind.label().to_string(),
            kind,
            limit: None,
            nullable: true,
            has_default: false,
            generated: false,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }
}

/// Unique index definition preserving column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIndexSpec {
    pub name: String,
    pub columns: Vec<String>,
}

impl UniqueIndexSpec {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
        }
    }
}
