use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::Result;

/// Outcome of loading one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub strategy: String,
    pub rows_requested: u64,
    pub rows_loaded: u64,
    pub rows_skipped: u64,
    pub retries: u64,
    pub batches: u64,
    pub duration_ms: u64,
}

/// Outcome of a multi-table run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub executed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data_files: Vec<PathBuf>,
    pub tables: Vec<TableReport>,
    pub rows_loaded: u64,
    pub rows_skipped: u64,
    pub duration_ms: u64,
}

impl LoadReport {
    pub(crate) fn push(&mut self, table: TableReport) {
        self.rows_loaded += table.rows_loaded;
        self.rows_skipped += table.rows_skipped;
        self.tables.push(table);
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
