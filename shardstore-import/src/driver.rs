//! Import driver: the three-stage table import pipeline
//!
//! [`ImportDriver`] turns one [`import_table`](ImportDriver::import_table)
//! call into a fan-out of jobs across three stages:
//!
//! 1. **Partition stage** — fetch a partition's chunk blobs from the source
//!    and register them with the catalog, receiving one shard id per chunk.
//! 2. **Chunk stage** — check a worker node out of the pool and ask it to
//!    start building the shard; a rejected or failed initiation releases
//!    the node and re-enqueues the same job.
//! 3. **Shard stage** — poll the worker until the shard is complete, then
//!    commit it to the catalog and return the node to the pool.
//!
//! Each stage is a queue drained by its own pool of tasks, sized by
//! [`ImportConfig`]. Shard polls are spaced by timer tasks: a shard waiting
//! for its next tick holds no poller slot, only a timer.
//!
//! Retries are unbounded with no backoff beyond queueing: a chunk job whose
//! initiation fails goes to the back of the chunk queue, and a poll that
//! errors counts as "still building".

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use shardstore_catalog::ShardManager;
use shardstore_cluster::{Node, NodeWorkerQueue};
use shardstore_core::{ImportField, ShardId, ShardImport, TableId, HIVE_SOURCE};

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::source::{PartitionChunkSupplier, SourceClient};
use crate::worker_client::{InitiateStatus, PollStatus, WorkerClient};

/// Collaborators the driver coordinates.
///
/// Passed explicitly at construction; the driver holds no global state.
#[derive(Debug, Clone)]
pub struct ImportDeps {
    pub source: Arc<dyn SourceClient>,
    pub catalog: Arc<dyn ShardManager>,
    pub workers: Arc<NodeWorkerQueue>,
    pub worker_client: Arc<dyn WorkerClient>,
}

/// One partition awaiting chunk fetch and registration. The supplier is
/// bound to the partition, so it also carries the name.
#[derive(Debug)]
struct PartitionJob {
    table_id: TableId,
    source_name: String,
    supplier: PartitionChunkSupplier,
    fields: Vec<ImportField>,
}

/// One registered chunk awaiting a worker and an initiate RPC.
///
/// Retries re-enqueue this same job, so the shard id never changes across
/// attempts.
#[derive(Debug)]
struct ChunkJob {
    shard_id: ShardId,
    import: ShardImport,
}

/// One initiated shard being polled to completion. Owns the worker node
/// until the shard is committed (or the pipeline shuts down).
#[derive(Debug)]
struct ShardJob {
    shard_id: ShardId,
    worker: Node,
}

/// Three-stage import pipeline with its own task pools.
///
/// Created with [`start`](ImportDriver::start) inside a Tokio runtime; the
/// stage workers are spawned immediately and drained by
/// [`stop`](ImportDriver::stop).
pub struct ImportDriver {
    inner: Arc<Inner>,
    shard_rx: Arc<Mutex<mpsc::UnboundedReceiver<ShardJob>>>,
}

impl std::fmt::Debug for ImportDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportDriver")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

struct Inner {
    deps: ImportDeps,
    config: ImportConfig,
    partition_tx: mpsc::UnboundedSender<PartitionJob>,
    chunk_tx: mpsc::UnboundedSender<ChunkJob>,
    shard_tx: mpsc::UnboundedSender<ShardJob>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl ImportDriver {
    /// Spawn the stage worker pools and return the running driver.
    pub fn start(deps: ImportDeps, config: ImportConfig) -> Self {
        let (partition_tx, partition_rx) = mpsc::unbounded_channel();
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let (shard_tx, shard_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let inner = Arc::new(Inner {
            deps,
            config,
            partition_tx,
            chunk_tx,
            shard_tx,
            shutdown_tx,
            shutdown_rx,
            tasks: parking_lot::Mutex::new(Vec::new()),
        });

        let partition_rx = Arc::new(Mutex::new(partition_rx));
        for _ in 0..inner.config.partition_parallelism {
            let inner_ref = Arc::clone(&inner);
            let rx = Arc::clone(&partition_rx);
            inner.spawn_tracked(async move {
                while let Some(job) = next_job(&rx, &inner_ref.shutdown_rx).await {
                    inner_ref.run_partition_job(job).await;
                }
            });
        }

        let chunk_rx = Arc::new(Mutex::new(chunk_rx));
        for _ in 0..inner.config.chunk_parallelism {
            let inner_ref = Arc::clone(&inner);
            let rx = Arc::clone(&chunk_rx);
            inner.spawn_tracked(async move {
                while let Some(job) = next_job(&rx, &inner_ref.shutdown_rx).await {
                    inner_ref.run_chunk_job(job).await;
                }
            });
        }

        let shard_rx = Arc::new(Mutex::new(shard_rx));
        for _ in 0..inner.config.shard_poll_parallelism {
            let inner_ref = Arc::clone(&inner);
            let rx = Arc::clone(&shard_rx);
            inner.spawn_tracked(async move {
                while let Some(job) = next_job(&rx, &inner_ref.shutdown_rx).await {
                    inner_ref.run_shard_job(job).await;
                }
            });
        }

        Self { inner, shard_rx }
    }

    /// Import `database.table` from the named source into the sharded store.
    ///
    /// Arguments are validated and the table registered synchronously;
    /// partition discovery errors also surface here. The per-partition work
    /// itself is asynchronous: this returns as soon as every partition job
    /// is queued.
    pub async fn import_table(
        &self,
        table_id: TableId,
        source_name: &str,
        database: &str,
        table: &str,
        fields: Vec<ImportField>,
    ) -> Result<()> {
        if fields.is_empty() {
            return Err(ImportError::InvalidArgument("fields is empty".into()));
        }
        if source_name != HIVE_SOURCE {
            return Err(ImportError::InvalidArgument(format!(
                "unsupported source name: {source_name}"
            )));
        }
        if self.inner.stopping() {
            return Err(ImportError::Stopped);
        }

        self.inner
            .deps
            .catalog
            .create_import_table(table_id, source_name, database, table)
            .await?;

        let partitions = self
            .inner
            .deps
            .source
            .partition_names(database, table)
            .await?;
        debug!(table_id, partitions = partitions.len(), "scheduling partition imports");

        for partition in partitions {
            let supplier = PartitionChunkSupplier::new(
                Arc::clone(&self.inner.deps.source),
                database,
                table,
                partition,
            );
            self.inner.submit_partition(PartitionJob {
                table_id,
                source_name: source_name.to_string(),
                supplier,
                fields: fields.clone(),
            });
        }
        Ok(())
    }

    /// Stop all three stages.
    ///
    /// No new work is accepted; each in-flight job runs to its next
    /// observable transition and exits. Poll ticks that have not fired yet
    /// are discarded, returning the worker they hold to the pool. The shard
    /// manager retains any still-uncommitted shard records. Idempotent.
    pub async fn stop(&self) {
        let _ = self.inner.shutdown_tx.send(true);

        let tasks: Vec<_> = self.inner.tasks.lock().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "pipeline task failed during shutdown");
            }
        }

        // Jobs that were queued but never polled still own a worker each.
        let mut shard_rx = self.shard_rx.lock().await;
        while let Ok(job) = shard_rx.try_recv() {
            warn!(
                shard_id = job.shard_id,
                node = %job.worker,
                "pipeline stopped before final poll; returning worker"
            );
            self.inner.deps.workers.release(job.worker);
        }
    }
}

impl Drop for ImportDriver {
    fn drop(&mut self) {
        // Lets stage workers wind down even when stop() was never called.
        let _ = self.inner.shutdown_tx.send(true);
    }
}

/// Pop the next job for one stage worker, or `None` once shutdown is
/// signalled. Workers share the stage queue behind a mutex; the lock is
/// held only while waiting for one pop.
async fn next_job<T>(
    rx: &Arc<Mutex<mpsc::UnboundedReceiver<T>>>,
    shutdown: &watch::Receiver<bool>,
) -> Option<T> {
    let mut shutdown = shutdown.clone();
    let mut rx = rx.lock().await;
    tokio::select! {
        biased;
        _ = shutdown.wait_for(|stopped| *stopped) => None,
        job = rx.recv() => job,
    }
}

impl Inner {
    fn stopping(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    fn spawn_tracked(&self, fut: impl Future<Output = ()> + Send + 'static) {
        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(tokio::spawn(fut));
    }

    fn submit_partition(&self, job: PartitionJob) {
        if self.stopping() {
            warn!(partition = %job.supplier.partition(), "partition stage stopped; dropping job");
            return;
        }
        if let Err(rejected) = self.partition_tx.send(job) {
            warn!(
                partition = %rejected.0.supplier.partition(),
                "partition stage gone; dropping job"
            );
        }
    }

    fn submit_chunk(&self, job: ChunkJob) {
        if self.stopping() {
            warn!(shard_id = job.shard_id, "chunk stage stopped; dropping job");
            return;
        }
        if let Err(rejected) = self.chunk_tx.send(job) {
            warn!(shard_id = rejected.0.shard_id, "chunk stage gone; dropping job");
        }
    }

    /// Enqueue a shard poll. The job owns a worker, so a drop on any path
    /// must give the node back.
    fn submit_shard(&self, job: ShardJob) {
        if self.stopping() {
            warn!(shard_id = job.shard_id, "shard stage stopped; returning worker");
            self.deps.workers.release(job.worker);
            return;
        }
        if let Err(rejected) = self.shard_tx.send(job) {
            let job = rejected.0;
            warn!(shard_id = job.shard_id, "shard stage gone; returning worker");
            self.deps.workers.release(job.worker);
        }
    }

    /// Enqueue a shard poll after `delay` on a detached timer, so the wait
    /// occupies no poller slot. A shutdown during the wait discards the
    /// tick and returns the worker.
    fn schedule_shard_poll(self: &Arc<Self>, job: ShardJob, delay: Duration) {
        if self.stopping() {
            warn!(shard_id = job.shard_id, "shard stage stopped; returning worker");
            self.deps.workers.release(job.worker);
            return;
        }
        let inner = Arc::clone(self);
        self.spawn_tracked(async move {
            let mut shutdown = inner.shutdown_rx.clone();
            tokio::select! {
                biased;
                _ = shutdown.wait_for(|stopped| *stopped) => {
                    warn!(
                        shard_id = job.shard_id,
                        node = %job.worker,
                        "discarding scheduled poll after shutdown; returning worker"
                    );
                    inner.deps.workers.release(job.worker);
                }
                _ = tokio::time::sleep(delay) => inner.submit_shard(job),
            }
        });
    }

    /// Partition stage: fetch chunks, register them, fan out chunk jobs.
    /// Any failure abandons this partition; others are unaffected.
    async fn run_partition_job(self: &Arc<Self>, job: PartitionJob) {
        let partition = job.supplier.partition();
        let chunks = match job.supplier.get().await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(
                    partition = %partition,
                    error = %e,
                    "chunk fetch failed; abandoning partition"
                );
                return;
            }
        };

        let shard_ids = match self
            .deps
            .catalog
            .create_import_partition(job.table_id, partition, &chunks)
            .await
        {
            Ok(shard_ids) => shard_ids,
            Err(e) => {
                warn!(
                    partition = %partition,
                    error = %e,
                    "partition registration failed; abandoning partition"
                );
                return;
            }
        };
        debug!(
            partition = %partition,
            chunks = chunks.len(),
            ?shard_ids,
            "registered partition chunks"
        );

        if shard_ids.len() != chunks.len() {
            error!(
                partition = %partition,
                chunks = chunks.len(),
                shard_ids = shard_ids.len(),
                "catalog returned misaligned shard ids; abandoning partition"
            );
            return;
        }

        for (chunk, shard_id) in chunks.into_iter().zip(shard_ids) {
            let import = ShardImport::new(job.source_name.clone(), chunk, job.fields.clone());
            self.submit_chunk(ChunkJob { shard_id, import });
        }
    }

    /// Chunk stage: check out a worker and initiate the shard build.
    /// Rejection or transport failure releases the worker and re-enqueues
    /// this same job; shutdown abandons it without a worker held.
    async fn run_chunk_job(self: &Arc<Self>, job: ChunkJob) {
        debug!(shard_id = job.shard_id, "acquiring worker for shard");

        let mut shutdown = self.shutdown_rx.clone();
        let worker = tokio::select! {
            biased;
            _ = shutdown.wait_for(|stopped| *stopped) => {
                warn!(shard_id = job.shard_id, "shutdown while waiting for a worker; abandoning chunk job");
                return;
            }
            acquired = self.deps.workers.acquire() => match acquired {
                Ok(worker) => worker,
                Err(e) => {
                    warn!(shard_id = job.shard_id, error = %e, "worker pool closed; abandoning chunk job");
                    return;
                }
            }
        };
        debug!(shard_id = job.shard_id, node = %worker, "acquired worker for shard");

        match self
            .deps
            .worker_client
            .initiate_shard(&worker, job.shard_id, &job.import)
            .await
        {
            Ok(InitiateStatus::Accepted) => {
                debug!(shard_id = job.shard_id, "initiated shard creation");
                self.schedule_shard_poll(
                    ShardJob {
                        shard_id: job.shard_id,
                        worker,
                    },
                    self.config.initial_shard_poll_delay,
                );
            }
            Ok(InitiateStatus::Rejected { status }) => {
                warn!(
                    shard_id = job.shard_id,
                    status, "worker rejected shard creation; retrying"
                );
                self.deps.workers.release(worker);
                self.submit_chunk(job);
            }
            Err(e) => {
                warn!(
                    shard_id = job.shard_id,
                    error = %e,
                    "shard creation request failed; retrying"
                );
                self.deps.workers.release(worker);
                self.submit_chunk(job);
            }
        }
    }

    /// Shard stage: one poll per tick. Commit happens only after the worker
    /// reports the shard complete; everything else reschedules the poll.
    async fn run_shard_job(self: &Arc<Self>, job: ShardJob) {
        match self
            .deps
            .worker_client
            .shard_status(&job.worker, job.shard_id)
            .await
        {
            Ok(PollStatus::Done) => {
                match self
                    .deps
                    .catalog
                    .commit_shard(job.shard_id, &job.worker.node_id)
                    .await
                {
                    Ok(()) => {
                        info!(shard_id = job.shard_id, node = %job.worker, "shard imported");
                    }
                    Err(e) => {
                        error!(
                            shard_id = job.shard_id,
                            error = %e,
                            "shard commit failed; shard left uncommitted"
                        );
                    }
                }
                self.deps.workers.release(job.worker);
            }
            Ok(PollStatus::InProgress) => {
                debug!(shard_id = job.shard_id, "shard still building");
                self.schedule_shard_poll(job, self.config.shard_poll_interval);
            }
            Ok(PollStatus::Unexpected { status }) => {
                warn!(shard_id = job.shard_id, status, "unexpected shard status; polling again");
                self.schedule_shard_poll(job, self.config.shard_poll_interval);
            }
            Err(e) => {
                warn!(
                    shard_id = job.shard_id,
                    error = %e,
                    "shard status request failed; polling again"
                );
                self.schedule_shard_poll(job, self.config.shard_poll_interval);
            }
        }
    }
}
