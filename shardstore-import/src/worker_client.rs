//! HTTP client for worker shard endpoints
//!
//! Workers expose `PUT /v1/shard/{id}` to start building a shard and
//! `GET /v1/shard/{id}` to report progress. Status codes are the protocol:
//! 202 means accepted (or still building), 200 means complete, anything
//! else is a rejection or an unexpected state. Transport failures surface
//! as errors and are retried by the pipeline, not here.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use shardstore_cluster::Node;
use shardstore_core::{ShardId, ShardImport};

use crate::error::Result;

/// Outcome of asking a worker to start building a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiateStatus {
    /// The worker accepted the build (HTTP 202).
    Accepted,
    /// The worker refused with a non-202 status.
    Rejected { status: u16 },
}

/// Outcome of polling a worker for shard completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// The shard is still building (HTTP 202).
    InProgress,
    /// The shard is complete (HTTP 200).
    Done,
    /// The worker answered with a status the protocol does not define.
    Unexpected { status: u16 },
}

/// Typed access to a worker's shard endpoints.
#[async_trait]
pub trait WorkerClient: Debug + Send + Sync {
    /// Ask `worker` to start building `shard_id` from `import`.
    async fn initiate_shard(
        &self,
        worker: &Node,
        shard_id: ShardId,
        import: &ShardImport,
    ) -> Result<InitiateStatus>;

    /// Ask `worker` whether `shard_id` is complete.
    async fn shard_status(&self, worker: &Node, shard_id: ShardId) -> Result<PollStatus>;
}

/// Timeouts for the HTTP worker client.
#[derive(Debug, Clone)]
pub struct WorkerClientConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for WorkerClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// `reqwest`-backed worker client.
#[derive(Debug)]
pub struct HttpWorkerClient {
    http: reqwest::Client,
}

impl HttpWorkerClient {
    pub fn new(config: WorkerClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http })
    }

    fn shard_uri(worker: &Node, shard_id: ShardId) -> String {
        format!("{}/v1/shard/{}", worker.http_uri, shard_id)
    }
}

#[async_trait]
impl WorkerClient for HttpWorkerClient {
    async fn initiate_shard(
        &self,
        worker: &Node,
        shard_id: ShardId,
        import: &ShardImport,
    ) -> Result<InitiateStatus> {
        let url = Self::shard_uri(worker, shard_id);
        let response = self.http.put(&url).json(import).send().await?;

        match response.status().as_u16() {
            202 => Ok(InitiateStatus::Accepted),
            status => Ok(InitiateStatus::Rejected { status }),
        }
    }

    async fn shard_status(&self, worker: &Node, shard_id: ShardId) -> Result<PollStatus> {
        let url = Self::shard_uri(worker, shard_id);
        let response = self.http.get(&url).send().await?;

        match response.status().as_u16() {
            202 => Ok(PollStatus::InProgress),
            200 => Ok(PollStatus::Done),
            status => Ok(PollStatus::Unexpected { status }),
        }
    }
}
