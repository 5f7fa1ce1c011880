use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rowseed_core::{Dialect, TableRef};
use tracing::debug;

use crate::errors::Result;

/// SQL script mirroring every statement of a run.
///
/// Statements are written one per line and terminated by `;`. Copy batches
/// land in a CSV file next to the script and are referenced by a `\COPY`
/// line, so the script can be replayed with `psql -f`.
#[derive(Debug)]
pub struct ScriptWriter {
    path: PathBuf,
    dir: PathBuf,
    stem: String,
    file: BufWriter<File>,
    data_files: Vec<PathBuf>,
}

impl ScriptWriter {
    /// Create (or truncate) the script at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let path = std::path::absolute(path)?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&dir)?;

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "rowseed".to_string());
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&path)?;

        Ok(Self {
            path,
            dir,
            stem,
            file: BufWriter::new(file),
            data_files: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// CSV files written for copy batches, in emission order.
    pub fn data_files(&self) -> &[PathBuf] {
        &self.data_files
    }

    /// Append one statement on a single line.
    pub fn statement(&mut self, statement: &str) -> Result<()> {
        let line = statement.trim().trim_end_matches(';').replace('\n', " ");
        writeln!(self.file, "{line};")?;
        Ok(())
    }

    /// Write `data` to the batch's CSV file and reference it from the script.
    pub fn copy(
        &mut self,
        dialect: &dyn Dialect,
        table: &TableRef,
        columns: &[String],
        data: &str,
        first_row: u64,
        last_row: u64,
    ) -> Result<PathBuf> {
        let data_path = self.data_path(table, first_row, last_row);
        let mut data_file = BufWriter::new(File::create(&data_path)?);
        writeln!(data_file, "{data}")?;
        data_file.flush()?;

        let location = data_path.to_string_lossy().replace('\'', "''");
        writeln!(
            self.file,
            "\\COPY {} ({}) FROM '{location}' WITH (FORMAT CSV);",
            dialect.quote_table(table),
            dialect.column_list(columns)
        )?;
        debug!(path = %data_path.display(), "copy data file written");

        self.data_files.push(data_path.clone());
        Ok(data_path)
    }

    /// Flush and return the script path.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.file.flush()?;
        Ok(self.path)
    }

    fn data_path(&self, table: &TableRef, first_row: u64, last_row: u64) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_rows_{first_row}_to_{last_row}.csv",
            self.stem,
            table.to_string().replace('"', "")
        ))
    }
}
