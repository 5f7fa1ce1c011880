use std::sync::Mutex;
use std::time::Duration;

use rowseed_core::TableRef;
use tracing::{debug, info};

/// A table load is about to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStarted {
    pub table: TableRef,
    pub strategy: &'static str,
    pub rows: u64,
    pub batch_size: u64,
    pub batches: u64,
}

/// One batch reached the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCompleted {
    pub table: TableRef,
    /// 1-based batch number.
    pub batch: u64,
    pub batches: u64,
    pub rows: u64,
    pub skipped: u64,
    pub duration: Duration,
}

/// Every batch of a table completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCompleted {
    pub table: TableRef,
    pub rows: u64,
    pub rows_loaded: u64,
    pub rows_skipped: u64,
    pub duration: Duration,
}

/// Telemetry sink for load progress.
pub trait ProgressReporter: Send + Sync {
    fn table_started(&self, event: &TableStarted);
    fn batch_completed(&self, event: &BatchCompleted);
    fn table_completed(&self, event: &TableCompleted);
}

/// Reports progress as structured log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn table_started(&self, event: &TableStarted) {
        info!(
            table = %event.table,
            strategy = event.strategy,
            rows = event.rows,
            batch_size = event.batch_size,
            batches = event.batches,
            "loading table"
        );
    }

    fn batch_completed(&self, event: &BatchCompleted) {
        debug!(
            table = %event.table,
            batch = event.batch,
            batches = event.batches,
            rows = event.rows,
            skipped = event.skipped,
            duration_ms = event.duration.as_millis() as u64,
            "batch loaded"
        );
    }

    fn table_completed(&self, event: &TableCompleted) {
        info!(
            table = %event.table,
            rows = event.rows,
            rows_loaded = event.rows_loaded,
            rows_skipped = event.rows_skipped,
            duration_ms = event.duration.as_millis() as u64,
            "table loaded"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    TableStarted(TableStarted),
    BatchCompleted(BatchCompleted),
    TableCompleted(TableCompleted),
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ProgressReporter for RecordingReporter {
    fn table_started(&self, event: &TableStarted) {
        self.push(ProgressEvent::TableStarted(event.clone()));
    }

    fn batch_completed(&self, event: &BatchCompleted) {
        self.push(ProgressEvent::BatchCompleted(event.clone()));
    }

    fn table_completed(&self, event: &TableCompleted) {
        self.push(ProgressEvent::TableCompleted(event.clone()));
    }
}
