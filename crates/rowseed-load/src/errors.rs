use rowseed_generate::GenerationError;
use thiserror::Error;

/// Errors raised while loading tables.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("catalog error: {0}")]
    Catalog(#[from] rowseed_core::Error),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoadError>;
