use crate::{queue::Shard, GraphSink};
use std::sync::Arc;
use tracing::debug;

/// Drains a shard into the sink until the shard closes or shutdown is signaled.
pub(crate) async fn run(shard: Shard, sink: Arc<dyn GraphSink>, drain: drain::Watch) {
    let shutdown = drain.signaled();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _release = &mut shutdown => {
                debug!(pending = shard.len(), "Shutting down");
                shard.close();
                return;
            }

            key = shard.next() => match key {
                Some(key) => sink.process(key).await,
                None => {
                    debug!("Shard closed");
                    return;
                }
            },
        }
    }
}
