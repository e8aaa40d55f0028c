use gslb_controller_core::Operation;
use prometheus_client::{
    encoding::{EncodeLabelSet, EncodeLabelValue},
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug, Default)]
pub struct QueueMetrics {
    published: Family<OpLabels, Counter>,
    coalesced: Family<OpLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct OpLabels {
    op: Op,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
enum Op {
    Add,
    Update,
    Delete,
}

// === impl QueueMetrics ===

impl QueueMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let published = Family::default();
        prom.register(
            "published_keys",
            "Count of change keys published to the graph layer",
            published.clone(),
        );

        let coalesced = Family::default();
        prom.register(
            "coalesced_keys",
            "Count of change keys dropped because an identical key was pending",
            coalesced.clone(),
        );

        Self {
            published,
            coalesced,
        }
    }

    pub(crate) fn published(&self, op: Operation) {
        self.published.get_or_create(&OpLabels::from(op)).inc();
    }

    pub(crate) fn coalesced(&self, op: Operation) {
        self.coalesced.get_or_create(&OpLabels::from(op)).inc();
    }

    #[cfg(test)]
    pub(crate) fn published_count(&self, op: Operation) -> u64 {
        self.published.get_or_create(&OpLabels::from(op)).get()
    }
}

impl From<Operation> for OpLabels {
    fn from(op: Operation) -> Self {
        let op = match op {
            Operation::Add => Op::Add,
            Operation::Update => Op::Update,
            Operation::Delete => Op::Delete,
        };
        Self { op }
    }
}
