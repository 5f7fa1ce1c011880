use std::sync::Arc;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tracing::debug;

use rowseed_core::{Dialect, PostgresDialect, TableRef, Value};

use crate::connection::{Connection, ConnectionFactory};
use crate::errors::Result;

const CURRENT_TIMEOUT_SQL: &str = r#"
select case when setting = reset_val then null
            else current_setting('statement_timeout') end
from pg_settings
where name = 'statement_timeout'
"#;

/// PostgreSQL session checked out of a pool.
pub struct PostgresConnection {
    conn: PoolConnection<Postgres>,
}

impl PostgresConnection {
    pub fn new(conn: PoolConnection<Postgres>) -> Self {
        Self { conn }
    }

    async fn run(&mut self, sql: &str) -> Result<u64> {
        let result = sqlx::Executor::execute(&mut *self.conn, sqlx::raw_sql(sql)).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl Connection for PostgresConnection {
    fn dialect(&self) -> Arc<dyn Dialect> {
        Arc::new(PostgresDialect)
    }

    fn supports_copy(&self) -> bool {
        true
    }

    fn supports_statement_timeout(&self) -> bool {
        true
    }

    async fn current_statement_timeout(&mut self) -> Result<Option<String>> {
        let current: Option<String> = sqlx::query_scalar(CURRENT_TIMEOUT_SQL)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(current)
    }

    async fn set_statement_timeout(&mut self, timeout: &str) -> Result<()> {
        let literal = PostgresDialect.quote_literal(&Value::from(timeout));
        self.run(&format!("SET statement_timeout = {literal}"))
            .await
            .map(|_| ())
    }

    async fn reset_statement_timeout(&mut self) -> Result<()> {
        self.run("RESET statement_timeout").await.map(|_| ())
    }

    async fn execute_insert(&mut self, statement: &str) -> Result<u64> {
        self.run(statement).await
    }

    async fn stream_copy(
        &mut self,
        table: &TableRef,
        columns: &[String],
        data: &str,
    ) -> Result<u64> {
        let statement = format!(
            "COPY {} ({}) FROM STDIN WITH (FORMAT CSV)",
            PostgresDialect.quote_table(table),
            PostgresDialect.column_list(columns)
        );
        let mut copy = self.conn.copy_in_raw(&statement).await?;
        copy.send(data.as_bytes()).await?;
        let rows = copy.finish().await?;
        debug!(table = %table, rows, "copy stream finished");
        Ok(rows)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        // Dropping the pool connection hands it back to the pool.
        drop(self.conn);
        Ok(())
    }
}

/// Hands out pooled PostgreSQL sessions.
#[derive(Debug, Clone)]
pub struct PostgresConnectionFactory {
    pool: PgPool,
}

impl PostgresConnectionFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionFactory for PostgresConnectionFactory {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PostgresConnection::new(conn)))
    }
}
