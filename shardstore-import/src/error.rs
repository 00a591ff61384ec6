//! Error types for import operations

use thiserror::Error;

/// Errors from the source-side metadata and chunk backend.
///
/// All source failures are considered transient from the pipeline's point of
/// view; the stage that observes one decides whether to retry or abandon.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Partition metadata listing failed.
    #[error("source metadata error: {0}")]
    Metadata(String),

    /// Chunk materialisation failed for one partition.
    #[error("source chunk error: {0}")]
    Chunks(String),
}

/// Errors surfaced by the import pipeline.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The caller passed arguments the pipeline rejects up front.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Catalog(#[from] shardstore_catalog::CatalogError),

    /// Transport-level failure talking to a worker node.
    #[error("worker request failed: {0}")]
    Http(String),

    /// The pipeline has been stopped and no longer accepts work.
    #[error("import pipeline stopped")]
    Stopped,
}

impl From<reqwest::Error> for ImportError {
    fn from(e: reqwest::Error) -> Self {
        ImportError::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
