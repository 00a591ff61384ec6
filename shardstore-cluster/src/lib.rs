//! Cluster node handles and the bounded node-worker pool
//!
//! A [`Node`] is a reachable cluster member that builds shards over HTTP.
//! The [`NodeWorkerQueue`] is the one contended resource of the import
//! pipeline: a bounded FIFO pool of nodes with paired acquire/release and a
//! cancellable wait.

mod error;
mod node;
mod queue;

pub use error::{ClusterError, Result};
pub use node::Node;
pub use queue::NodeWorkerQueue;
