//! In-memory shard-manager catalog
//!
//! Single-process implementation used by tests and embedded deployments.
//! Shard ids are assigned from a monotonically increasing counter, starting
//! at 1.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use shardstore_core::{ShardId, TableId};

use crate::error::{CatalogError, Result};
use crate::ShardManager;

/// Registration record for one import table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    pub table_id: TableId,
    pub source_name: String,
    pub database: String,
    pub table: String,
}

impl TableRecord {
    fn identity(&self) -> String {
        format!("{}:{}.{}", self.source_name, self.database, self.table)
    }
}

/// Registration record for one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardRecord {
    pub shard_id: ShardId,
    pub table_id: TableId,
    pub partition: String,
    /// Size of the source chunk this shard is built from.
    pub chunk_bytes: usize,
    /// Node the shard was committed against. `None` while pending.
    pub node_id: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    next_shard_id: ShardId,
    tables: HashMap<TableId, TableRecord>,
    shards: BTreeMap<ShardId, ShardRecord>,
}

/// In-memory [`ShardManager`].
#[derive(Debug, Default)]
pub struct MemoryShardManager {
    inner: parking_lot::Mutex<Inner>,
}

impl MemoryShardManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration record for a table, if present.
    pub fn table(&self, table_id: TableId) -> Option<TableRecord> {
        self.inner.lock().tables.get(&table_id).cloned()
    }

    /// Registration record for a shard, if present.
    pub fn shard(&self, shard_id: ShardId) -> Option<ShardRecord> {
        self.inner.lock().shards.get(&shard_id).cloned()
    }

    /// All shards committed against a node, in shard-id order.
    pub fn committed_shards(&self) -> Vec<ShardRecord> {
        self.inner
            .lock()
            .shards
            .values()
            .filter(|shard| shard.node_id.is_some())
            .cloned()
            .collect()
    }

    /// Shard ids registered for one partition, in assignment order.
    pub fn partition_shard_ids(&self, table_id: TableId, partition: &str) -> Vec<ShardId> {
        self.inner
            .lock()
            .shards
            .values()
            .filter(|shard| shard.table_id == table_id && shard.partition == partition)
            .map(|shard| shard.shard_id)
            .collect()
    }
}

#[async_trait]
impl ShardManager for MemoryShardManager {
    async fn create_import_table(
        &self,
        table_id: TableId,
        source_name: &str,
        database: &str,
        table: &str,
    ) -> Result<()> {
        let record = TableRecord {
            table_id,
            source_name: source_name.to_string(),
            database: database.to_string(),
            table: table.to_string(),
        };

        let mut inner = self.inner.lock();
        match inner.tables.get(&table_id) {
            None => {
                inner.tables.insert(table_id, record);
                Ok(())
            }
            Some(existing) if *existing == record => Ok(()),
            Some(existing) => Err(CatalogError::TableConflict {
                table_id,
                existing: existing.identity(),
                requested: record.identity(),
            }),
        }
    }

    async fn create_import_partition(
        &self,
        table_id: TableId,
        partition: &str,
        chunks: &[Vec<u8>],
    ) -> Result<Vec<ShardId>> {
        let mut inner = self.inner.lock();
        if !inner.tables.contains_key(&table_id) {
            return Err(CatalogError::UnknownTable(table_id));
        }

        let mut shard_ids = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            inner.next_shard_id += 1;
            let shard_id = inner.next_shard_id;
            inner.shards.insert(
                shard_id,
                ShardRecord {
                    shard_id,
                    table_id,
                    partition: partition.to_string(),
                    chunk_bytes: chunk.len(),
                    node_id: None,
                },
            );
            shard_ids.push(shard_id);
        }
        Ok(shard_ids)
    }

    async fn commit_shard(&self, shard_id: ShardId, node_id: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let shard = inner
            .shards
            .get_mut(&shard_id)
            .ok_or(CatalogError::UnknownShard(shard_id))?;

        if let Some(ref existing) = shard.node_id {
            tracing::debug!(shard_id, existing = %existing, node = %node_id, "shard re-committed");
        }
        shard.node_id = Some(node_id.to_string());
        Ok(())
    }
}
