use rowseed_core::TableRef;
use thiserror::Error;

/// Errors emitted while preparing or running row generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(
        "exhausted retries looking for unique values for row {row} of '{table}'; \
         set raise_on_duplicates = false to skip such rows instead"
    )]
    DuplicateKey { table: TableRef, row: u64 },
    #[error("catalog error: {0}")]
    Catalog(#[from] rowseed_core::Error),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
