//! Error types for catalog operations

use thiserror::Error;

/// Errors from the shard-manager catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No import table registered under this id.
    #[error("unknown import table: {0}")]
    UnknownTable(u64),

    /// No shard registered under this id.
    #[error("unknown shard: {0}")]
    UnknownShard(u64),

    /// A table id was re-registered with a different identity.
    #[error("table {table_id} is already registered as {existing}, refusing {requested}")]
    TableConflict {
        table_id: u64,
        existing: String,
        requested: String,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
