//! Import pipeline configuration

use std::time::Duration;

/// Concurrency budgets and poll cadence for the import pipeline.
///
/// Each of the three stages runs on its own pool of tasks; the shard stage
/// additionally owns the poll timers.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Concurrent partition jobs (chunk fetch + catalog registration).
    pub partition_parallelism: usize,
    /// Concurrent chunk jobs (worker acquisition + initiate RPC).
    pub chunk_parallelism: usize,
    /// Concurrent shard poll RPCs.
    pub shard_poll_parallelism: usize,
    /// Delay between successive polls of one shard.
    pub shard_poll_interval: Duration,
    /// Delay between initiating a shard and its first poll.
    pub initial_shard_poll_delay: Duration,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            partition_parallelism: 50,
            chunk_parallelism: 50,
            shard_poll_parallelism: 50,
            shard_poll_interval: Duration::from_secs(1),
            initial_shard_poll_delay: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.partition_parallelism, 50);
        assert_eq!(config.chunk_parallelism, 50);
        assert_eq!(config.shard_poll_parallelism, 50);
        assert_eq!(config.shard_poll_interval, Duration::from_secs(1));
        assert_eq!(config.initial_shard_poll_delay, Duration::from_secs(1));
    }
}
