use crate::{Resource, SharedIndex};
use futures::prelude::*;
use gslb_controller_k8s_api::Event;
use std::sync::Arc;

/// Feeds one member cluster's watch events into the shared index.
#[derive(Clone, Debug)]
pub struct ClusterIndex {
    cluster: Arc<str>,
    index: SharedIndex,
}

impl ClusterIndex {
    pub fn new(cluster: impl Into<Arc<str>>, index: SharedIndex) -> Self {
        Self {
            cluster: cluster.into(),
            index,
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn add(&self, obj: impl Into<Resource>) {
        self.handle(Event::Add(obj.into()));
    }

    pub fn update(&self, old: impl Into<Resource>, new: impl Into<Resource>) {
        self.handle(Event::Update(old.into(), new.into()));
    }

    pub fn delete(&self, obj: impl Into<Resource>) {
        self.handle(Event::Delete(obj.into()));
    }

    /// Applies events until the stream ends.
    ///
    /// The write lock is held for one event at a time and is never held across an await.
    pub async fn run<K, S>(self, events: S)
    where
        K: Into<Resource>,
        S: Stream<Item = Event<K>>,
    {
        let mut events = std::pin::pin!(events);
        while let Some(ev) = events.next().await {
            let ev = match ev {
                Event::Add(obj) => Event::Add(obj.into()),
                Event::Update(old, new) => Event::Update(old.into(), new.into()),
                Event::Delete(obj) => Event::Delete(obj.into()),
            };
            self.handle(ev);
        }
    }

    fn handle(&self, event: Event<Resource>) {
        self.index.write().handle(&self.cluster, event);
    }
}
