//! Import pipeline for loading warehouse tables into the sharded store
//!
//! # Architecture
//!
//! - [`driver`]: the three-stage pipeline (partition fetch → chunk dispatch
//!   → shard polling) behind [`ImportDriver`]
//! - [`source`]: source-side metadata and chunk access (Hive-compatible)
//! - [`worker_client`]: typed HTTP client for worker shard endpoints
//! - [`config`]: concurrency budgets and poll cadence
//! - [`error`]: error types for import operations
//!
//! The driver coordinates the catalog (`shardstore-catalog`) and the node
//! worker pool (`shardstore-cluster`); collaborators are passed in
//! explicitly at construction. This crate brings in `reqwest` for HTTP —
//! consumers that only need the catalog or pool types don't pay that cost.

pub mod config;
pub mod driver;
pub mod error;
pub mod source;
pub mod worker_client;

pub use config::ImportConfig;
pub use driver::{ImportDeps, ImportDriver};
pub use error::{ImportError, Result, SourceError};
pub use source::{PartitionChunkSupplier, SourceClient};
pub use worker_client::{
    HttpWorkerClient, InitiateStatus, PollStatus, WorkerClient, WorkerClientConfig,
};
