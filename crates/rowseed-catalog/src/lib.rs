//! Database-backed schema catalogs.

pub mod postgres;

pub use postgres::PostgresCatalog;
