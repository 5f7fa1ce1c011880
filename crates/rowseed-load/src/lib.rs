//! Batch loading for rowseed.
//!
//! A `Loader` prepares one `RowGenerator` per table, splits the requested rows
//! into batches, and hands each batch to a load strategy that emits a
//! multi-row INSERT or a COPY stream to the database, an SQL script, or both.

pub mod connection;
pub mod errors;
pub mod handler;
pub mod loader;
pub mod postgres;
pub mod progress;
pub mod report;
pub mod script;
pub mod strategy;
pub mod table_loader;

pub use connection::{Connection, ConnectionFactory};
pub use errors::{LoadError, Result};
pub use handler::{BatchSink, ConnectionFacts, ConnectionHandler, Session};
pub use loader::{Loader, LoaderConfig, tables_from_plan};
pub use postgres::{PostgresConnection, PostgresConnectionFactory};
pub use progress::{
    BatchCompleted, ProgressEvent, ProgressReporter, RecordingReporter, TableCompleted,
    TableStarted, TracingReporter,
};
pub use report::{LoadReport, TableReport};
pub use script::ScriptWriter;
pub use strategy::{BatchOutcome, BulkInsertStrategy, CopyStrategy, LoadStrategy, strategy_for};
pub use table_loader::{TableLoader, batch_count};
