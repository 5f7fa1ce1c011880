use std::sync::Arc;

use async_trait::async_trait;
use rowseed_core::{Dialect, TableRef};

use crate::errors::Result;

/// One database session receiving generated batches.
#[async_trait]
pub trait Connection: Send {
    /// Quoting rules of the target.
    fn dialect(&self) -> Arc<dyn Dialect>;

    /// Whether `stream_copy` is available.
    fn supports_copy(&self) -> bool;

    fn supports_statement_timeout(&self) -> bool;

    /// Session statement timeout, `None` when it is the server default.
    async fn current_statement_timeout(&mut self) -> Result<Option<String>>;

    async fn set_statement_timeout(&mut self, timeout: &str) -> Result<()>;

    async fn reset_statement_timeout(&mut self) -> Result<()>;

    /// Run one multi-row INSERT; returns the affected row count.
    async fn execute_insert(&mut self, statement: &str) -> Result<u64>;

    /// Stream CSV lines into `table` through the copy protocol.
    async fn stream_copy(&mut self, table: &TableRef, columns: &[String], data: &str)
    -> Result<u64>;

    /// Release the session.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens connections on demand, one per table load.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connection>>;
}
