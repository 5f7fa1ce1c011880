use std::time::Instant;

use rowseed_generate::RowGenerator;
use tracing::warn;

use crate::errors::{LoadError, Result};
use crate::handler::{ConnectionHandler, Session};
use crate::progress::{BatchCompleted, ProgressReporter, TableCompleted, TableStarted};
use crate::report::TableReport;
use crate::script::ScriptWriter;
use crate::strategy::LoadStrategy;

/// Number of batches needed for `total_rows`.
pub fn batch_count(total_rows: u64, batch_size: u64) -> u64 {
    total_rows.div_ceil(batch_size)
}

/// Loads one table in sequential batches over a single scoped session.
pub struct TableLoader<'a> {
    handler: &'a ConnectionHandler,
    strategy: &'a dyn LoadStrategy,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> TableLoader<'a> {
    pub fn new(
        handler: &'a ConnectionHandler,
        strategy: &'a dyn LoadStrategy,
        reporter: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            handler,
            strategy,
            reporter,
        }
    }

    /// Generate and emit row numbers `0..total_rows`.
    pub async fn load(
        &self,
        generator: &mut RowGenerator,
        total_rows: u64,
        batch_size: u64,
        script: Option<&mut ScriptWriter>,
    ) -> Result<TableReport> {
        if batch_size == 0 {
            return Err(LoadError::Config(format!(
                "batch size for '{}' must be greater than zero",
                generator.table()
            )));
        }

        let batches = batch_count(total_rows, batch_size);
        self.reporter.table_started(&TableStarted {
            table: generator.table().clone(),
            strategy: self.strategy.name(),
            rows: total_rows,
            batch_size,
            batches,
        });

        let started = Instant::now();
        let mut session = self.handler.open().await?;
        let loaded = self
            .load_batches(&mut session, generator, total_rows, batch_size, script)
            .await;
        let released = session.close().await;

        let (rows_loaded, rows_skipped) = match (loaded, released) {
            (Ok(counts), Ok(())) => counts,
            (Err(err), released) => {
                if let Err(release_err) = released {
                    warn!(
                        table = %generator.table(),
                        error = %release_err,
                        "failed to release session after load error"
                    );
                }
                return Err(err);
            }
            // Every batch is committed by now, so the table still counts as loaded.
            (Ok(counts), Err(release_err)) => {
                warn!(
                    table = %generator.table(),
                    error = %release_err,
                    "failed to release session after loading"
                );
                counts
            }
        };

        let duration = started.elapsed();
        self.reporter.table_completed(&TableCompleted {
            table: generator.table().clone(),
            rows: total_rows,
            rows_loaded,
            rows_skipped,
            duration,
        });

        Ok(TableReport {
            table: generator.table().to_string(),
            strategy: self.strategy.name().to_string(),
            rows_requested: total_rows,
            rows_loaded,
            rows_skipped,
            retries: generator.stats().retries,
            batches,
            duration_ms: duration.as_millis() as u64,
        })
    }

    async fn load_batches(
        &self,
        session: &mut Session,
        generator: &mut RowGenerator,
        total_rows: u64,
        batch_size: u64,
        mut script: Option<&mut ScriptWriter>,
    ) -> Result<(u64, u64)> {
        let batches = batch_count(total_rows, batch_size);
        let mut loaded = 0;
        let mut skipped = 0;

        for batch in 0..batches {
            let first = batch * batch_size;
            let last = (first + batch_size).min(total_rows);

            let started = Instant::now();
            let mut sink = session.sink(script.as_deref_mut());
            let outcome = self
                .strategy
                .load_batch(generator, first..last, &mut sink)
                .await?;

            loaded += outcome.loaded;
            skipped += outcome.skipped;
            self.reporter.batch_completed(&BatchCompleted {
                table: generator.table().clone(),
                batch: batch + 1,
                batches,
                rows: outcome.loaded,
                skipped: outcome.skipped,
                duration: started.elapsed(),
            });
        }

        Ok((loaded, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::batch_count;

    #[test]
    fn batches_round_up() {
        assert_eq!(batch_count(1000, 500), 2);
        assert_eq!(batch_count(1001, 500), 3);
        assert_eq!(batch_count(0, 500), 0);
        assert_eq!(batch_count(3, 100_000), 1);
    }
}
