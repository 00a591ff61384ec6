//! Cluster node handles

/// A cluster node that builds shards over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Stable identifier recorded in shard commits.
    pub node_id: String,
    /// Base URI of the node's HTTP surface, e.g. `http://10.0.0.3:8080`.
    pub http_uri: String,
}

impl Node {
    pub fn new(node_id: impl Into<String>, http_uri: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            http_uri: http_uri.into(),
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.node_id)
    }
}
