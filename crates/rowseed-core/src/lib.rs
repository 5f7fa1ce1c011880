//! Core contracts and helpers for rowseed.
//!
//! This crate defines the table/column model handed to the generators, the
//! `SchemaCatalog` collaborator contract, and the SQL dialect rules shared by
//! the loading strategies.

pub mod associations;
pub mod catalog;
pub mod dialect;
pub mod error;
pub mod schema;
pub mod types;
pub mod value;

pub use associations::{
    AssociationSpec, BelongsToSpec, Eligibility, PolymorphicSpec, PolymorphicTarget,
    SamplingPolicy,
};
pub use catalog::{InMemoryCatalog, SchemaCatalog};
pub use dialect::{Dialect, PostgresDialect};
pub use error::{Error, Result};
pub use schema::{ColumnSpec, TableRef, UniqueIndexSpec};
pub use types::{ColumnKind, classify_sql_type, parse_inline_enum};
pub use value::Value;

/// Schema assumed for unqualified table names.
pub const DEFAULT_SCHEMA: &str = "public";
