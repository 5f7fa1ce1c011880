use std::ops::Range;

use async_trait::async_trait;
use rowseed_core::{Dialect, TableRef};
use rowseed_generate::{Row, RowGenerator};

use crate::errors::Result;
use crate::handler::BatchSink;

/// Rows produced for one batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub loaded: u64,
    pub skipped: u64,
}

/// Turns a range of row numbers into one sink operation.
#[async_trait]
pub trait LoadStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generate `rows` and emit every accepted one. Skipped rows shrink the
    /// batch; a batch with nothing accepted emits nothing.
    async fn load_batch(
        &self,
        generator: &mut RowGenerator,
        rows: Range<u64>,
        sink: &mut BatchSink<'_>,
    ) -> Result<BatchOutcome>;
}

/// Pick COPY when the target supports it, multi-row INSERT otherwise.
pub fn strategy_for(supports_copy: bool) -> Box<dyn LoadStrategy> {
    if supports_copy {
        Box::new(CopyStrategy)
    } else {
        Box::new(BulkInsertStrategy)
    }
}

fn generate_rows(generator: &mut RowGenerator, rows: Range<u64>) -> Result<(Vec<Row>, u64)> {
    let mut accepted = Vec::with_capacity(rows.end.saturating_sub(rows.start) as usize);
    let mut skipped = 0;
    for row in rows {
        match generator.generate(row)?.into_row() {
            Some(values) => accepted.push(values),
            None => skipped += 1,
        }
    }
    Ok((accepted, skipped))
}

/// One `INSERT ... VALUES (..),(..)` statement per batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct BulkInsertStrategy;

impl BulkInsertStrategy {
    /// `None` for an empty batch.
    pub fn statement(
        dialect: &dyn Dialect,
        table: &TableRef,
        columns: &[String],
        rows: &[Row],
    ) -> Option<String> {
        if rows.is_empty() {
            return None;
        }
        let values = rows
            .iter()
            .map(|row| {
                let literals = row
                    .iter()
                    .map(|value| dialect.quote_literal(value))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({literals})")
            })
            .collect::<Vec<_>>()
            .join(",");

        Some(format!(
            "INSERT INTO {} ({}) VALUES {values}",
            dialect.quote_table(table),
            dialect.column_list(columns)
        ))
    }
}

#[async_trait]
impl LoadStrategy for BulkInsertStrategy {
    fn name(&self) -> &'static str {
        "BULK INSERT"
    }

    async fn load_batch(
        &self,
        generator: &mut RowGenerator,
        rows: Range<u64>,
        sink: &mut BatchSink<'_>,
    ) -> Result<BatchOutcome> {
        let (accepted, skipped) = generate_rows(generator, rows)?;
        let statement =
            Self::statement(sink.dialect(), generator.table(), generator.columns(), &accepted);
        if let Some(statement) = statement {
            sink.insert(&statement).await?;
        }
        Ok(BatchOutcome {
            loaded: accepted.len() as u64,
            skipped,
        })
    }
}

/// CSV stream through the copy protocol.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyStrategy;

impl CopyStrategy {
    /// CSV lines for `rows`; `None` for an empty batch.
    pub fn encode(dialect: &dyn Dialect, rows: &[Row]) -> Option<String> {
        if rows.is_empty() {
            return None;
        }
        let lines = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| dialect.copy_field(value))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>();
        Some(lines.join("\n"))
    }
}

#[async_trait]
impl LoadStrategy for CopyStrategy {
    fn name(&self) -> &'static str {
        "COPY"
    }

    async fn load_batch(
        &self,
        generator: &mut RowGenerator,
        rows: Range<u64>,
        sink: &mut BatchSink<'_>,
    ) -> Result<BatchOutcome> {
        let first_row = rows.start;
        let last_row = rows.end.saturating_sub(1);
        let (accepted, skipped) = generate_rows(generator, rows)?;
        if let Some(data) = Self::encode(sink.dialect(), &accepted) {
            sink.copy(
                generator.table(),
                generator.columns(),
                &data,
                first_row,
                last_row,
            )
            .await?;
        }
        Ok(BatchOutcome {
            loaded: accepted.len() as u64,
            skipped,
        })
    }
}
