use async_trait::async_trait;
use sqlx::PgPool;

use rowseed_core::{
    AssociationSpec, ColumnSpec, Dialect, Eligibility, Error, PostgresDialect, Result,
    SchemaCatalog, TableRef, UniqueIndexSpec, Value,
};

mod mapper;
mod queries;

/// Schema catalog reading PostgreSQL system tables.
#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Create a catalog using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SchemaCatalog for PostgresCatalog {
    async fn columns(&self, table: &TableRef) -> Result<Vec<ColumnSpec>> {
        let raw = queries::list_columns(&self.pool, table.schema_or_default(), &table.name).await?;
        if raw.is_empty() {
            return Err(Error::InvalidSchema(format!("table '{table}' not found")));
        }
        Ok(mapper::map_columns(raw))
    }

    async fn primary_key(&self, table: &TableRef) -> Result<Vec<String>> {
        queries::get_primary_key(&self.pool, table.schema_or_default(), &table.name).await
    }

    async fn foreign_keys(&self, table: &TableRef) -> Result<Vec<AssociationSpec>> {
        let raw =
            queries::list_foreign_keys(&self.pool, table.schema_or_default(), &table.name).await?;
        Ok(mapper::map_foreign_keys(raw))
    }

    async fn unique_indexes(&self, table: &TableRef) -> Result<Vec<UniqueIndexSpec>> {
        let raw =
            queries::list_unique_indexes(&self.pool, table.schema_or_default(), &table.name)
                .await?;
        Ok(mapper::map_unique_indexes(raw))
    }

    async fn key_values(
        &self,
        table: &TableRef,
        column: &str,
        eligibility: Option<&Eligibility>,
    ) -> Result<Vec<Value>> {
        let kind = self
            .columns(table)
            .await?
            .into_iter()
            .find(|spec| spec.name == column)
            .map(|spec| spec.kind)
            .ok_or_else(|| {
                Error::InvalidSchema(format!("column '{column}' not found on '{table}'"))
            })?;

        let dialect = PostgresDialect;
        let qualified = TableRef::new(Some(table.schema_or_default()), &table.name);
        let raw = queries::list_key_values(
            &self.pool,
            &dialect.quote_table(&qualified),
            &dialect.quote_identifier(column),
            eligibility.map(|eligibility| eligibility.filter.as_str()),
        )
        .await?;

        let values = mapper::map_key_values(&kind, raw);
        tracing::debug!(
            table = %table,
            column,
            filtered = eligibility.is_some(),
            count = values.len(),
            "fetched key values"
        );
        Ok(values)
    }
}
