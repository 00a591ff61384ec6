//! Error types for worker-pool operations

use thiserror::Error;

/// Errors from the node worker pool.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The pool was closed while waiting for a node.
    #[error("node worker queue closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, ClusterError>;
