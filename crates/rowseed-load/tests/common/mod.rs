#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rowseed_core::{
    ColumnKind, ColumnSpec, Dialect, InMemoryCatalog, PostgresDialect, TableRef, UniqueIndexSpec,
};
use rowseed_generate::{GenerationOptions, MinimalFaker};
use rowseed_load::{Connection, ConnectionFactory, LoadError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    CurrentTimeout,
    SetTimeout(String),
    ResetTimeout,
    Insert(String),
    Copy {
        table: String,
        columns: Vec<String>,
        data: String,
    },
    Close,
}

/// Factory whose connections record every call into one shared log.
#[derive(Clone, Default)]
pub struct RecordingFactory {
    calls: Arc<Mutex<Vec<Call>>>,
    copy: bool,
    prior_timeout: Option<String>,
    fail_writes: bool,
    fail_close: bool,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_copy(mut self) -> Self {
        self.copy = true;
        self
    }

    pub fn with_prior_timeout(mut self, timeout: &str) -> Self {
        self.prior_timeout = Some(timeout.to_string());
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Session connections fail to close; the initial probe still closes cleanly.
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("call log").clone()
    }

    pub fn inserts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Insert(statement) => Some(statement),
                _ => None,
            })
            .collect()
    }

    pub fn copies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Copy { data, .. } => Some(data),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("call log").push(call);
    }
}

#[async_trait]
impl ConnectionFactory for RecordingFactory {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        let probe = !self.calls().contains(&Call::Connect);
        self.record(Call::Connect);
        Ok(Box::new(RecordingConnection {
            factory: self.clone(),
            probe,
        }))
    }
}

struct RecordingConnection {
    factory: RecordingFactory,
    /// First connection of the factory, opened by the handler to learn its facts.
    probe: bool,
}

impl RecordingConnection {
    fn write(&self, call: Call) -> Result<u64> {
        if self.factory.fail_writes {
            return Err(LoadError::Io(std::io::Error::other("write rejected")));
        }
        self.factory.record(call);
        Ok(1)
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn dialect(&self) -> Arc<dyn Dialect> {
        Arc::new(PostgresDialect)
    }

    fn supports_copy(&self) -> bool {
        self.factory.copy
    }

    fn supports_statement_timeout(&self) -> bool {
        true
    }

    async fn current_statement_timeout(&mut self) -> Result<Option<String>> {
        self.factory.record(Call::CurrentTimeout);
        Ok(self.factory.prior_timeout.clone())
    }

    async fn set_statement_timeout(&mut self, timeout: &str) -> Result<()> {
        self.factory.record(Call::SetTimeout(timeout.to_string()));
        Ok(())
    }

    async fn reset_statement_timeout(&mut self) -> Result<()> {
        self.factory.record(Call::ResetTimeout);
        Ok(())
    }

    async fn execute_insert(&mut self, statement: &str) -> Result<u64> {
        self.write(Call::Insert(statement.to_string()))
    }

    async fn stream_copy(
        &mut self,
        table: &TableRef,
        columns: &[String],
        data: &str,
    ) -> Result<u64> {
        self.write(Call::Copy {
            table: table.to_string(),
            columns: columns.to_vec(),
            data: data.to_string(),
        })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.factory.record(Call::Close);
        if self.factory.fail_close && !self.probe {
            return Err(LoadError::Io(std::io::Error::other("connection lost")));
        }
        Ok(())
    }
}

/// `widgets` (serial id, name, quantity) and `tags` (unique label).
pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_table(
            "widgets",
            vec![
                ColumnSpec::new("id", ColumnKind::Integer)
                    .with_limit(4)
                    .not_null()
                    .with_default(),
                ColumnSpec::new("name", ColumnKind::Text).with_limit(20),
                ColumnSpec::new("quantity", ColumnKind::Integer).with_limit(2),
            ],
        )
        .with_primary_key("widgets", &["id"])
        .with_table(
            "tags",
            vec![ColumnSpec::new("label", ColumnKind::Text).not_null()],
        )
        .with_unique_index("tags", UniqueIndexSpec::new("tags_label_key", &["label"]))
}

pub fn options() -> GenerationOptions {
    GenerationOptions::default()
        .with_seed(7)
        .with_faker(MinimalFaker)
}

pub fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rowseed-load-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    dir
}
