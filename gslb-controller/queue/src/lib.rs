//! Hostname-sharded work queues.
//!
//! Change keys are published into one of `N` shards, chosen by hashing the key's hostname. Each
//! shard is FIFO, so every key that affects a hostname is consumed in the order it was published,
//! no matter which cluster or watch produced it. Keys for different hostnames may be consumed in
//! any relative order.
//!
//! Publishing never blocks. Consumers dequeue at a bounded rate (see [`RateLimit`]).

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod limit;
pub mod metrics;
mod shard;

pub use self::{limit::RateLimit, metrics::QueueMetrics, shard::Shard};
use gslb_controller_core::{bucket, ChangeKey};
use std::sync::Arc;

/// Owns the set of shards.
#[derive(Clone, Debug)]
pub struct Queues {
    shards: Arc<[Shard]>,
}

/// Publishes change keys into the shard that owns their hostname.
#[derive(Clone, Debug)]
pub struct Publisher {
    shards: Arc<[Shard]>,
    metrics: QueueMetrics,
}

// === impl Queues ===

impl Queues {
    pub fn new(workers: usize, limit: RateLimit) -> Self {
        assert!(workers > 0, "at least one shard is required");
        let shards = (0..workers).map(|_| Shard::new(limit)).collect();
        Self { shards }
    }

    pub fn publisher(&self, metrics: QueueMetrics) -> Publisher {
        Publisher {
            shards: self.shards.clone(),
            metrics,
        }
    }

    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    /// Returns the shard that owns `hostname`.
    pub fn shard_for(&self, hostname: &str) -> &Shard {
        &self.shards[bucket(hostname, self.shards.len())]
    }

    /// The total number of pending keys across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stops all shards. Pending keys are still delivered; consumers observe the end of the queue
    /// once drained.
    pub fn close(&self) {
        for shard in self.shards.iter() {
            shard.close();
        }
    }
}

// === impl Publisher ===

impl Publisher {
    pub fn publish(&self, key: ChangeKey) {
        let idx = bucket(&key.hostname, self.shards.len());
        tracing::info!(
            cluster = %key.cluster,
            ns = %key.namespace,
            name = %key.name,
            object_type = %key.object_type,
            op = %key.op,
            shard = idx,
            "Published key {key}",
        );
        let op = key.op;
        if self.shards[idx].add(key) {
            self.metrics.published(op);
        } else {
            self.metrics.coalesced(op);
        }
    }
}
