use crate::limit::{RateLimit, TokenBucket};
use ahash::AHashMap as HashMap;
use gslb_controller_core::{ChangeKey, ObjectType, Operation};
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc};
use tokio::{sync::Notify, time};

/// A single ordered queue.
#[derive(Clone, Debug)]
pub struct Shard {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<State>,
    limiter: Mutex<TokenBucket>,
    notify: Notify,
}

#[derive(Debug, Default)]
struct State {
    pending: VecDeque<(u64, ChangeKey)>,

    /// The most recently enqueued, still pending, operation for each target.
    latest: HashMap<Target, (Operation, u64)>,

    next_seq: u64,
    closed: bool,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
struct Target {
    object_type: ObjectType,
    cluster: Arc<str>,
    namespace: String,
    name: String,
}

// === impl Shard ===

impl Shard {
    pub(crate) fn new(limit: RateLimit) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                limiter: Mutex::new(TokenBucket::new(limit)),
                notify: Notify::new(),
            }),
        }
    }

    /// Appends a key to the queue.
    ///
    /// Returns false if the key was coalesced with an identical pending key, i.e. no other
    /// operation for the same target was enqueued since.
    pub fn add(&self, key: ChangeKey) -> bool {
        let mut state = self.inner.state.lock();
        if state.closed {
            tracing::debug!(%key, "Queue closed; dropping key");
            return false;
        }

        let target = Target::from(&key);
        if let Some((op, _)) = state.latest.get(&target) {
            if *op == key.op {
                tracing::trace!(%key, "Coalesced");
                return false;
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.latest.insert(target, (key.op, seq));
        state.pending.push_back((seq, key));
        drop(state);

        self.inner.notify.notify_one();
        true
    }

    /// Waits for the next key, honoring the dequeue rate limit.
    ///
    /// Returns `None` once the shard is closed and drained.
    pub async fn next(&self) -> Option<ChangeKey> {
        loop {
            let notified = self.inner.notify.notified();
            let ready = {
                let state = self.inner.state.lock();
                if state.pending.is_empty() && state.closed {
                    return None;
                }
                !state.pending.is_empty()
            };

            if ready {
                let wait = self.inner.limiter.lock().reserve(time::Instant::now());
                if !wait.is_zero() {
                    time::sleep(wait).await;
                }
                if let Some(key) = self.try_next() {
                    return Some(key);
                }
                continue;
            }

            notified.await;
        }
    }

    /// Removes the next key without waiting or consuming rate-limit tokens.
    pub fn try_next(&self) -> Option<ChangeKey> {
        self.inner.state.lock().pop()
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn close(&self) {
        self.inner.state.lock().closed = true;
        self.inner.notify.notify_waiters();
        // Wake a consumer that has not yet registered interest.
        self.inner.notify.notify_one();
    }
}

// === impl State ===

impl State {
    fn pop(&mut self) -> Option<ChangeKey> {
        let (seq, key) = self.pending.pop_front()?;
        let target = Target::from(&key);
        if matches!(self.latest.get(&target), Some((_, s)) if *s == seq) {
            self.latest.remove(&target);
        }
        Some(key)
    }
}

// === impl Target ===

impl From<&ChangeKey> for Target {
    fn from(key: &ChangeKey) -> Self {
        Self {
            object_type: key.object_type,
            cluster: key.cluster.clone(),
            namespace: key.namespace.clone(),
            name: key.name.clone(),
        }
    }
}
