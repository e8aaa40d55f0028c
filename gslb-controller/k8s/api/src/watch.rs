use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use futures::{future, stream, Stream, StreamExt};
use kube::{runtime::watcher, ResourceExt};
use tracing::{debug, trace, warn};

/// A change to a watched object, with the prior state of updated objects.
#[derive(Clone, Debug, PartialEq)]
pub enum Event<K> {
    Add(K),
    Update(K, K),
    Delete(K),
}

/// Converts a watcher's apply/delete/relist notifications into add/update/delete events.
///
/// The last-seen version of every object is cached so that updates carry the prior state and so
/// that objects which disappeared while the watch was relisting can be reported as deleted.
#[derive(Debug)]
pub struct Cache<K> {
    known: HashMap<ObjectKey, K>,

    /// Set while a relist is in progress. Tracks the objects seen during the relist.
    relist: Option<HashSet<ObjectKey>>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
struct ObjectKey {
    namespace: String,
    name: String,
}

/// Adapts a watcher stream into a stream of [`Event`]s.
///
/// Watch errors are logged and skipped; the watcher is expected to retry with its own backoff.
pub fn events<K, S>(watch: S) -> impl Stream<Item = Event<K>>
where
    K: ResourceExt + Clone,
    S: Stream<Item = watcher::Result<watcher::Event<K>>>,
{
    let mut cache = Cache::default();
    watch
        .filter_map(|res| {
            future::ready(match res {
                Ok(ev) => Some(ev),
                Err(error) => {
                    warn!(%error, "Watch failed");
                    None
                }
            })
        })
        .flat_map(move |ev| stream::iter(cache.process(ev)))
}

// === impl Cache ===

impl<K> Default for Cache<K> {
    fn default() -> Self {
        Self {
            known: HashMap::default(),
            relist: None,
        }
    }
}

impl<K: ResourceExt + Clone> Cache<K> {
    pub fn process(&mut self, event: watcher::Event<K>) -> Vec<Event<K>> {
        match event {
            watcher::Event::Apply(obj) => self.apply(obj).into_iter().collect(),

            watcher::Event::Delete(obj) => {
                let key = ObjectKey::from_obj(&obj);
                if let Some(relist) = self.relist.as_mut() {
                    relist.remove(&key);
                }
                if self.known.remove(&key).is_none() {
                    trace!(ns = %key.namespace, name = %key.name, "Deleted unknown object");
                }
                vec![Event::Delete(obj)]
            }

            watcher::Event::Init => {
                debug!(known = self.known.len(), "Relisting");
                self.relist = Some(HashSet::default());
                vec![]
            }

            watcher::Event::InitApply(obj) => {
                if let Some(relist) = self.relist.as_mut() {
                    relist.insert(ObjectKey::from_obj(&obj));
                }
                self.apply(obj).into_iter().collect()
            }

            watcher::Event::InitDone => {
                let Some(seen) = self.relist.take() else {
                    return vec![];
                };
                let removed = self
                    .known
                    .keys()
                    .filter(|key| !seen.contains(*key))
                    .cloned()
                    .collect::<Vec<_>>();
                debug!(removed = removed.len(), "Relist complete");
                removed
                    .into_iter()
                    .filter_map(|key| self.known.remove(&key))
                    .map(Event::Delete)
                    .collect()
            }
        }
    }

    fn apply(&mut self, obj: K) -> Option<Event<K>> {
        let key = ObjectKey::from_obj(&obj);
        match self.known.insert(key, obj.clone()) {
            None => Some(Event::Add(obj)),
            Some(old) if old.resource_version().is_some()
                && old.resource_version() == obj.resource_version() =>
            {
                trace!(name = %obj.name_any(), "Unchanged resource version");
                None
            }
            Some(old) => Some(Event::Update(old, obj)),
        }
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

// === impl ObjectKey ===

impl ObjectKey {
    fn from_obj<K: ResourceExt>(obj: &K) -> Self {
        Self {
            namespace: obj.namespace().unwrap_or_default(),
            name: obj.name_any(),
        }
    }
}
