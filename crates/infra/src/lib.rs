//! Infrastructure layer: the in-memory storefront database and process config.

pub mod config;
pub mod db;


pub use config::{ConfigError, StoreConfig};
pub use db::{Database, DbError, DbResult, Deleted, Sequences, Snapshot, TableCounts};
