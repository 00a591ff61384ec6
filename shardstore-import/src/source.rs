//! Source-side metadata and chunk access
//!
//! The source (a Hive-compatible warehouse in this revision) lists the
//! partitions of a table and materialises each partition as a finite list of
//! opaque chunk blobs. Chunk semantics are private to the source and to the
//! worker that builds the shard; the pipeline only moves the bytes.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SourceError;

/// Client for source-side table metadata and chunk production.
#[async_trait]
pub trait SourceClient: Debug + Send + Sync {
    /// List the partition names of `database.table`.
    async fn partition_names(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<String>, SourceError>;

    /// Materialise the chunk blobs for one partition.
    async fn partition_chunks(
        &self,
        database: &str,
        table: &str,
        partition: &str,
    ) -> Result<Vec<Vec<u8>>, SourceError>;
}

/// Chunk producer bound to one `(database, table, partition)`.
///
/// Failures propagate to the caller; the partition stage does not retry.
#[derive(Debug, Clone)]
pub struct PartitionChunkSupplier {
    source: Arc<dyn SourceClient>,
    database: String,
    table: String,
    partition: String,
}

impl PartitionChunkSupplier {
    pub fn new(
        source: Arc<dyn SourceClient>,
        database: impl Into<String>,
        table: impl Into<String>,
        partition: impl Into<String>,
    ) -> Self {
        Self {
            source,
            database: database.into(),
            table: table.into(),
            partition: partition.into(),
        }
    }

    /// Fetch the full chunk list for the bound partition.
    pub async fn get(&self) -> Result<Vec<Vec<u8>>, SourceError> {
        self.source
            .partition_chunks(&self.database, &self.table, &self.partition)
            .await
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }
}
