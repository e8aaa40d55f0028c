use crate::core::ChangeKey;
use tracing::info;

/// Consumes change keys on behalf of the graph layer.
///
/// Keys for a given hostname are delivered one at a time, in the order they were published.
#[async_trait::async_trait]
pub trait GraphSink: Send + Sync {
    async fn process(&self, key: ChangeKey);
}

/// Logs each key.
#[derive(Clone, Debug, Default)]
pub struct LogSink(());

#[async_trait::async_trait]
impl GraphSink for LogSink {
    async fn process(&self, key: ChangeKey) {
        info!(hostname = %key.hostname, "Processing key {key}");
    }
}
