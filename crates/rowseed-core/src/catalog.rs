use std::collections::HashMap;

use async_trait::async_trait;

use crate::associations::{AssociationSpec, Eligibility};
use crate::error::{Error, Result};
use crate::schema::{ColumnSpec, TableRef, UniqueIndexSpec};
use crate::value::Value;

/// Source of table metadata and referenced key values.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Columns of `table` in declaration order.
    async fn columns(&self, table: &TableRef) -> Result<Vec<ColumnSpec>>;

    /// Primary-key column names of `table`, empty when it has none.
    async fn primary_key(&self, table: &TableRef) -> Result<Vec<String>>;

    /// Single-column foreign keys declared on `table`.
    async fn foreign_keys(&self, table: &TableRef) -> Result<Vec<AssociationSpec>>;

    /// Unique indexes of `table`, excluding the primary key.
    async fn unique_indexes(&self, table: &TableRef) -> Result<Vec<UniqueIndexSpec>>;

    /// Values of `column` in `table`, optionally narrowed by an eligibility filter.
    async fn key_values(
        &self,
        table: &TableRef,
        column: &str,
        eligibility: Option<&Eligibility>,
    ) -> Result<Vec<Value>>;

    /// Primary-key values of `table`; requires a single-column primary key.
    async fn primary_key_values(
        &self,
        table: &TableRef,
        eligibility: Option<&Eligibility>,
    ) -> Result<Vec<Value>> {
        let primary_key = self.primary_key(table).await?;
        match primary_key.as_slice() {
            [column] => self.key_values(table, column, eligibility).await,
            [] => Err(Error::InvalidSchema(format!(
                "table '{table}' has no primary key"
            ))),
            _ => Err(Error::Unsupported(format!(
                "table '{table}' has a composite primary key"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CatalogTable {
    columns: Vec<ColumnSpec>,
    primary_key: Vec<String>,
    foreign_keys: Vec<AssociationSpec>,
    unique_indexes: Vec<UniqueIndexSpec>,
    keys: HashMap<(String, Option<String>), Vec<Value>>,
}

/// Catalog backed by in-process declarations.
///
/// Key values registered without a filter answer unfiltered lookups; values
/// registered with a filter answer lookups carrying exactly that filter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    tables: HashMap<String, CatalogTable>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, table: &TableRef) -> &mut CatalogTable {
        self.tables.entry(table.qualified()).or_default()
    }

    pub fn with_table(mut self, table: impl Into<TableRef>, columns: Vec<ColumnSpec>) -> Self {
        self.entry(&table.into()).columns = columns;
        self
    }

    pub fn with_primary_key(mut self, table: impl Into<TableRef>, columns: &[&str]) -> Self {
        self.entry(&table.into()).primary_key =
            columns.iter().map(|column| column.to_string()).collect();
        self
    }

    pub fn with_association(
        mut self,
        table: impl Into<TableRef>,
        association: AssociationSpec,
    ) -> Self {
        self.entry(&table.into()).foreign_keys.push(association);
        self
    }

    pub fn with_unique_index(mut self, table: impl Into<TableRef>, index: UniqueIndexSpec) -> Self {
        self.entry(&table.into()).unique_indexes.push(index);
        self
    }

    pub fn with_key_values(
        mut self,
        table: impl Into<TableRef>,
        column: &str,
        values: Vec<Value>,
    ) -> Self {
        self.entry(&table.into())
            .keys
            .insert((column.to_string(), None), values);
        self
    }

    pub fn with_filtered_key_values(
        mut self,
        table: impl Into<TableRef>,
        column: &str,
        filter: &str,
        values: Vec<Value>,
    ) -> Self {
        self.entry(&table.into())
            .keys
            .insert((column.to_string(), Some(filter.to_string())), values);
        self
    }

    fn table(&self, table: &TableRef) -> Result<&CatalogTable> {
        self.tables
            .get(&table.qualified())
            .ok_or_else(|| Error::InvalidSchema(format!("table '{table}' not found")))
    }
}

#[async_trait]
impl SchemaCatalog for InMemoryCatalog {
    async fn columns(&self, table: &TableRef) -> Result<Vec<ColumnSpec>> {
        Ok(self.table(table)?.columns.clone())
    }

    async fn primary_key(&self, table: &TableRef) -> Result<Vec<String>> {
        Ok(self.table(table)?.primary_key.clone())
    }

    async fn foreign_keys(&self, table: &TableRef) -> Result<Vec<AssociationSpec>> {
        Ok(self.table(table)?.foreign_keys.clone())
    }

    async fn unique_indexes(&self, table: &TableRef) -> Result<Vec<UniqueIndexSpec>> {
        Ok(self.table(table)?.unique_indexes.clone())
    }

    async fn key_values(
        &self,
        table: &TableRef,
        column: &str,
        eligibility: Option<&Eligibility>,
    ) -> Result<Vec<Value>> {
        let key = (
            column.to_string(),
            eligibility.map(|eligibility| eligibility.filter.clone()),
        );
        Ok(self
            .table(table)?
            .keys
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}
