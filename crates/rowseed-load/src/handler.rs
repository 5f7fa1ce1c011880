use std::sync::Arc;

use rowseed_core::{Dialect, TableRef, Value};
use tracing::{debug, warn};

use crate::connection::{Connection, ConnectionFactory};
use crate::errors::Result;
use crate::script::ScriptWriter;

/// Capabilities learned from one probe connection.
#[derive(Clone)]
pub struct ConnectionFacts {
    pub dialect: Arc<dyn Dialect>,
    pub supports_copy: bool,
    pub supports_statement_timeout: bool,
}

impl std::fmt::Debug for ConnectionFacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionFacts")
            .field("dialect", &self.dialect.name())
            .field("supports_copy", &self.supports_copy)
            .field("supports_statement_timeout", &self.supports_statement_timeout)
            .finish()
    }
}

/// Opens one scoped session per table and applies the statement timeout.
pub struct ConnectionHandler {
    factory: Arc<dyn ConnectionFactory>,
    statement_timeout: Option<String>,
    execute: bool,
    facts: ConnectionFacts,
}

impl ConnectionHandler {
    /// Probe the target once and cache what it supports.
    pub async fn new(
        factory: Arc<dyn ConnectionFactory>,
        statement_timeout: Option<String>,
    ) -> Result<Self> {
        let probe = factory.connect().await?;
        let facts = ConnectionFacts {
            dialect: probe.dialect(),
            supports_copy: probe.supports_copy(),
            supports_statement_timeout: probe.supports_statement_timeout(),
        };
        probe.close().await?;
        debug!(?facts, "connection facts cached");

        Ok(Self {
            factory,
            statement_timeout: statement_timeout.filter(|value| !value.trim().is_empty()),
            execute: true,
            facts,
        })
    }

    /// With `execute = false` sessions never touch the database.
    pub fn with_execute(mut self, execute: bool) -> Self {
        self.execute = execute;
        self
    }

    pub fn facts(&self) -> &ConnectionFacts {
        &self.facts
    }

    pub fn supports_copy(&self) -> bool {
        self.facts.supports_copy
    }

    pub fn supports_statement_timeout(&self) -> bool {
        self.facts.supports_statement_timeout
    }

    pub fn executes(&self) -> bool {
        self.execute
    }

    fn timeout_override(&self) -> Option<&str> {
        if self.facts.supports_statement_timeout {
            self.statement_timeout.as_deref()
        } else {
            None
        }
    }

    /// Script line applying the timeout, when one is configured and supported.
    pub fn timeout_set_command(&self) -> Option<String> {
        self.timeout_override().map(|timeout| {
            format!(
                "SET statement_timeout = {}",
                self.facts.dialect.quote_literal(&Value::from(timeout))
            )
        })
    }

    pub fn timeout_reset_command(&self) -> Option<String> {
        self.timeout_override()
            .map(|_| "RESET statement_timeout".to_string())
    }

    /// Open the session for one table load.
    ///
    /// Callers must hand the session back through [`Session::close`] on every
    /// path, which restores the prior timeout and releases the connection.
    pub async fn open(&self) -> Result<Session> {
        if !self.execute {
            return Ok(Session {
                connection: None,
                dialect: Arc::clone(&self.facts.dialect),
                restore: TimeoutRestore::Untouched,
            });
        }

        let mut connection = self.factory.connect().await?;
        let restore = match self.timeout_override() {
            Some(timeout) => match apply_timeout(connection.as_mut(), timeout).await {
                Ok(restore) => restore,
                Err(err) => {
                    if let Err(close_err) = connection.close().await {
                        warn!(error = %close_err, "failed to release connection");
                    }
                    return Err(err);
                }
            },
            None => TimeoutRestore::Untouched,
        };

        Ok(Session {
            connection: Some(connection),
            dialect: Arc::clone(&self.facts.dialect),
            restore,
        })
    }
}

async fn apply_timeout(connection: &mut dyn Connection, timeout: &str) -> Result<TimeoutRestore> {
    let prior = connection.current_statement_timeout().await?;
    connection.set_statement_timeout(timeout).await?;
    debug!(timeout, prior = ?prior, "statement timeout overridden");
    Ok(match prior {
        Some(value) => TimeoutRestore::Set(value),
        None => TimeoutRestore::Reset,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TimeoutRestore {
    Untouched,
    Reset,
    Set(String),
}

/// Scoped session for one table: the live connection (if executing) plus the
/// timeout to restore when it closes.
pub struct Session {
    connection: Option<Box<dyn Connection>>,
    dialect: Arc<dyn Dialect>,
    restore: TimeoutRestore,
}

impl Session {
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Borrow the session together with the optional script as a batch sink.
    pub fn sink<'a>(&'a mut self, script: Option<&'a mut ScriptWriter>) -> BatchSink<'a> {
        BatchSink {
            connection: self.connection.as_deref_mut(),
            dialect: self.dialect.as_ref(),
            script,
        }
    }

    /// Restore the timeout and release the connection.
    ///
    /// The connection is released even when the restore fails; the restore
    /// error wins.
    pub async fn close(self) -> Result<()> {
        let Some(mut connection) = self.connection else {
            return Ok(());
        };

        let restored = match &self.restore {
            TimeoutRestore::Untouched => Ok(()),
            TimeoutRestore::Reset => connection.reset_statement_timeout().await,
            TimeoutRestore::Set(value) => connection.set_statement_timeout(value).await,
        };
        let released = connection.close().await;
        restored?;
        released
    }
}

/// Destination of encoded batches: the database, the script, or both.
pub struct BatchSink<'a> {
    connection: Option<&'a mut (dyn Connection + 'static)>,
    dialect: &'a dyn Dialect,
    script: Option<&'a mut ScriptWriter>,
}

impl BatchSink<'_> {
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect
    }

    pub async fn insert(&mut self, statement: &str) -> Result<()> {
        if let Some(connection) = self.connection.as_deref_mut() {
            connection.execute_insert(statement).await?;
        }
        if let Some(script) = self.script.as_deref_mut() {
            script.statement(statement)?;
        }
        Ok(())
    }

    /// Emit CSV `data` covering row numbers `first_row..=last_row`.
    pub async fn copy(
        &mut self,
        table: &TableRef,
        columns: &[String],
        data: &str,
        first_row: u64,
        last_row: u64,
    ) -> Result<()> {
        if let Some(connection) = self.connection.as_deref_mut() {
            connection.stream_copy(table, columns, data).await?;
        }
        if let Some(script) = self.script.as_deref_mut() {
            script.copy(self.dialect, table, columns, data, first_row, last_row)?;
        }
        Ok(())
    }
}
