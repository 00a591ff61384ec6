//! Bounded node-worker pool with blocking acquire/release
//!
//! Checkout slots are tracked by a fair semaphore, so waiters are served
//! FIFO; the nodes themselves sit in a free list guarded by a plain mutex.
//! `close` wakes every pending waiter with [`ClusterError::Closed`], which
//! is how shutdown cancels jobs blocked on acquisition.

use std::collections::VecDeque;

use tokio::sync::Semaphore;

use crate::error::{ClusterError, Result};
use crate::node::Node;

/// Bounded registry of reachable worker nodes.
///
/// Every successful [`acquire`](Self::acquire) must be paired with exactly
/// one [`release`](Self::release); the pool never grows past the set of
/// nodes it was seeded with.
#[derive(Debug)]
pub struct NodeWorkerQueue {
    free: parking_lot::Mutex<VecDeque<Node>>,
    slots: Semaphore,
}

impl NodeWorkerQueue {
    /// Seed the pool with the given nodes.
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Self {
        let free: VecDeque<Node> = nodes.into_iter().collect();
        let slots = Semaphore::new(free.len());
        Self {
            free: parking_lot::Mutex::new(free),
            slots,
        }
    }

    /// Wait until a node is free and check it out.
    ///
    /// Returns [`ClusterError::Closed`] once the pool is closed, including
    /// for waiters already blocked at that point.
    pub async fn acquire(&self) -> Result<Node> {
        let permit = self
            .slots
            .acquire()
            .await
            .map_err(|_| ClusterError::Closed)?;
        // The permit now maps to one entry in the free list; hand the slot's
        // lifetime over to the caller until release().
        permit.forget();

        let node = self
            .free
            .lock()
            .pop_front()
            .expect("semaphore permit held without a free node");
        Ok(node)
    }

    /// Return a checked-out node to the pool.
    pub fn release(&self, node: Node) {
        self.free.lock().push_back(node);
        // After close() the slot is not re-armed: the node is retained for
        // accounting but never handed out again.
        if !self.slots.is_closed() {
            self.slots.add_permits(1);
        }
    }

    /// Close the pool. Pending and future `acquire` calls fail with
    /// [`ClusterError::Closed`]. Idempotent.
    pub fn close(&self) {
        self.slots.close();
    }

    /// Number of nodes currently checked in.
    pub fn idle_nodes(&self) -> usize {
        self.free.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn node(id: &str) -> Node {
        Node::new(id, format!("http://{id}:8080"))
    }

    #[tokio::test]
    async fn test_acquire_release_roundtrip() {
        let queue = NodeWorkerQueue::new([node("n1"), node("n2")]);
        assert_eq!(queue.idle_nodes(), 2);

        let first = queue.acquire().await.unwrap();
        let second = queue.acquire().await.unwrap();
        assert_eq!(queue.idle_nodes(), 0);
        assert_ne!(first.node_id, second.node_id);

        queue.release(first);
        queue.release(second);
        assert_eq!(queue.idle_nodes(), 2);
    }

    #[tokio::test]
    async fn test_acquire_is_fifo_over_nodes() {
        let queue = NodeWorkerQueue::new([node("n1"), node("n2")]);

        let first = queue.acquire().await.unwrap();
        assert_eq!(first.node_id, "n1");
        queue.release(first);

        // n2 is at the head now; the released n1 went to the back.
        assert_eq!(queue.acquire().await.unwrap().node_id, "n2");
    }

    #[tokio::test]
    async fn test_acquire_waits_for_release() {
        let queue = Arc::new(NodeWorkerQueue::new([node("n1")]));
        let held = queue.acquire().await.unwrap();

        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.acquire().await })
        };

        // The waiter cannot finish while the only node is checked out.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        queue.release(held);
        let reacquired = waiter.await.unwrap().unwrap();
        assert_eq!(reacquired.node_id, "n1");
    }

    #[tokio::test]
    async fn test_close_cancels_pending_acquire() {
        let queue = Arc::new(NodeWorkerQueue::new([]));

        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.acquire().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.close();

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(ClusterError::Closed)));
    }

    #[tokio::test]
    async fn test_acquire_after_close_fails() {
        let queue = NodeWorkerQueue::new([node("n1")]);
        queue.close();
        assert!(matches!(queue.acquire().await, Err(ClusterError::Closed)));
    }

    #[tokio::test]
    async fn test_release_after_close_keeps_node_checked_in() {
        let queue = NodeWorkerQueue::new([node("n1")]);
        let held = queue.acquire().await.unwrap();

        queue.close();
        queue.release(held);

        assert_eq!(queue.idle_nodes(), 1);
        assert!(matches!(queue.acquire().await, Err(ClusterError::Closed)));
    }
}
