//! Shard-manager catalog interface
//!
//! The catalog is the authoritative registry of import tables, partitions,
//! and shard-to-node bindings. The import pipeline issues three calls
//! against it: register a table, register one partition's chunks (receiving
//! index-aligned shard ids), and commit each shard once a worker has built
//! it.
//!
//! Commits may be retried; implementations are expected to make
//! `commit_shard` idempotent.

mod error;
mod memory;

pub use error::{CatalogError, Result};
pub use memory::{MemoryShardManager, ShardRecord, TableRecord};

use async_trait::async_trait;
use shardstore_core::{ShardId, TableId};
use std::fmt::Debug;

/// Authoritative registry of tables, partitions, and shard bindings.
#[async_trait]
pub trait ShardManager: Debug + Send + Sync {
    /// Register an import table. Idempotent for an identical registration.
    async fn create_import_table(
        &self,
        table_id: TableId,
        source_name: &str,
        database: &str,
        table: &str,
    ) -> Result<()>;

    /// Register one partition's chunks. Returns one shard id per chunk,
    /// index-aligned with `chunks`.
    async fn create_import_partition(
        &self,
        table_id: TableId,
        partition: &str,
        chunks: &[Vec<u8>],
    ) -> Result<Vec<ShardId>>;

    /// Mark a shard durable and bound to `node_id`. Safe to retry.
    async fn commit_shard(&self, shard_id: ShardId, node_id: &str) -> Result<()>;
}
