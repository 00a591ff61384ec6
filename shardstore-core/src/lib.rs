//! Shared data model for the shardstore import system
//!
//! Types that cross crate boundaries during a table import:
//!
//! - [`ImportField`] / [`ColumnType`]: the columns a caller asks to import
//! - [`ShardImport`]: the wire body sent to a worker to build one shard
//!
//! Also hosts the single-column [`aggregate`] functions, which are
//! independent of the import pipeline.

pub mod aggregate;
mod shard;

pub use shard::{ColumnType, ImportField, ShardImport};

/// Source tag accepted by the import pipeline in this revision.
pub const HIVE_SOURCE: &str = "hive";

/// Catalog-assigned table identifier.
pub type TableId = u64;

/// Catalog-assigned shard identifier.
pub type ShardId = u64;
