use crate::{
    store::{Membership, MembershipStore, Stores},
    Error,
};
use gslb_controller_core::{ChangeKey, Filter, ObjectMeta, ObjectRef, ObjectType, Operation};
use gslb_controller_k8s_api::{self as k8s, Event, ResourceExt};
use gslb_controller_queue::Publisher;
use parking_lot::RwLock;
use std::{fmt, sync::Arc};
use tracing::{debug, info, warn};

pub type SharedIndex = Arc<RwLock<Index>>;

/// Holds the membership of every tracked object across all member clusters.
pub struct Index {
    filter: Arc<dyn Filter>,
    publisher: Publisher,
    pub(crate) stores: Stores,
}

/// A watched object of any supported kind.
#[derive(Clone, Debug)]
pub enum Resource {
    Service(k8s::Service),
    Ingress(k8s::Ingress),
    Route(k8s::Route),
    Namespace(k8s::Namespace),
}

/// The outcome of classifying a single metadata record.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Verdict {
    Accepted(ObjectMeta),
    Rejected(ObjectMeta),

    /// The record lacks a hostname or IP, so the filter was not consulted.
    Skipped(ObjectMeta),
}

// === impl Index ===

impl Index {
    pub fn shared(filter: Arc<dyn Filter>, publisher: Publisher) -> SharedIndex {
        Arc::new(RwLock::new(Self {
            filter,
            publisher,
            stores: Stores::default(),
        }))
    }

    /// Applies a single watch event observed in `cluster`.
    ///
    /// Malformed events are logged and dropped.
    pub fn handle(&mut self, cluster: &Arc<str>, event: Event<Resource>) {
        let res = match event {
            Event::Add(res) => self.apply(cluster, None, res),
            Event::Update(old, new) => self.update(cluster, old, new),
            Event::Delete(res) => self.delete(cluster, res),
        };
        if let Err(error) = res {
            warn!(%cluster, %error, "Dropping event");
        }
    }

    pub fn membership(
        &self,
        object_type: ObjectType,
        cluster: &str,
        namespace: &str,
        name: &str,
    ) -> Option<Membership> {
        self.stores
            .get(object_type)
            .membership(&ObjectRef::new(cluster, namespace, name))
    }

    pub fn accepted(
        &self,
        object_type: ObjectType,
        cluster: &str,
        namespace: &str,
        name: &str,
    ) -> Option<&ObjectMeta> {
        self.stores
            .get(object_type)
            .accepted(&ObjectRef::new(cluster, namespace, name))
    }

    pub fn rejected(
        &self,
        object_type: ObjectType,
        cluster: &str,
        namespace: &str,
        name: &str,
    ) -> Option<&ObjectMeta> {
        self.stores
            .get(object_type)
            .rejected(&ObjectRef::new(cluster, namespace, name))
    }

    pub fn store(&self, object_type: ObjectType) -> &MembershipStore {
        self.stores.get(object_type)
    }

    pub(crate) fn filter(&self) -> &dyn Filter {
        &*self.filter
    }

    fn apply(
        &mut self,
        cluster: &Arc<str>,
        old: Option<k8s::Namespace>,
        res: Resource,
    ) -> Result<(), Error> {
        match res {
            Resource::Service(svc) => self.apply_service(cluster, svc),
            Resource::Ingress(ing) => self.apply_ingress(cluster, ing),
            Resource::Route(route) => self.apply_route(cluster, route),
            Resource::Namespace(ns) => self.apply_namespace(cluster, old, ns),
        }
    }

    fn update(&mut self, cluster: &Arc<str>, old: Resource, new: Resource) -> Result<(), Error> {
        if old.object_type() != new.object_type() {
            return Err(Error::MalformedEvent(format!(
                "{} updated to {}",
                old.object_type(),
                new.object_type()
            )));
        }
        if old.namespace() != new.namespace() || old.name() != new.name() {
            return Err(Error::MalformedEvent(format!(
                "{}/{} updated to {}/{}",
                old.namespace().unwrap_or_default(),
                old.name(),
                new.namespace().unwrap_or_default(),
                new.name(),
            )));
        }

        // Only the filter's namespace bookkeeping needs the prior state. Every other kind is
        // compared against the stored record instead.
        let old = match old {
            Resource::Namespace(ns) => Some(ns),
            _ => None,
        };
        self.apply(cluster, old, new)
    }

    fn delete(&mut self, cluster: &Arc<str>, res: Resource) -> Result<(), Error> {
        match res {
            Resource::Service(svc) => self.delete_service(cluster, svc),
            Resource::Ingress(ing) => self.delete_ingress(cluster, ing),
            Resource::Route(route) => self.delete_route(cluster, route),
            Resource::Namespace(ns) => self.delete_namespace(cluster, ns),
        }
    }

    /// Classifies a record that was added or changed.
    ///
    /// Records whose checksum matches the stored entry are ignored, so replaying an event never
    /// publishes a key.
    pub(crate) fn observe(&mut self, meta: ObjectMeta) -> Option<Operation> {
        let store = self.stores.get_mut(meta.object_type());
        if let Some((_, prior)) = store.get(&meta.object_ref()) {
            if prior.checksum == meta.checksum {
                debug!(
                    object_type = %meta.object_type(),
                    ns = %meta.namespace,
                    name = %meta.name,
                    "Unchanged"
                );
                return None;
            }
        }

        let verdict = classify(&*self.filter, meta);
        reconcile(store, &self.publisher, verdict)
    }

    /// Drops a record, withdrawing it from the graph layer if it was accepted.
    pub(crate) fn forget(&mut self, object_type: ObjectType, key: &ObjectRef) -> Option<Operation> {
        match self.stores.get_mut(object_type).remove(key)? {
            (Membership::Accepted, meta) => {
                self.publisher
                    .publish(ChangeKey::new(Operation::Delete, &meta));
                Some(Operation::Delete)
            }
            (Membership::Rejected, _) => {
                debug!(%object_type, %key, "Removed rejected object");
                None
            }
        }
    }

    /// Re-runs the filter over every stored record in `cluster`, moving records whose verdict
    /// changed.
    pub(crate) fn reevaluate(&mut self, cluster: &str) {
        for object_type in [ObjectType::Service, ObjectType::Ingress, ObjectType::Route] {
            let store = self.stores.get_mut(object_type);
            for (membership, meta) in store.entries(cluster) {
                if !meta.is_complete() {
                    continue;
                }
                match (membership, classify(&*self.filter, meta)) {
                    (Membership::Accepted, verdict @ Verdict::Rejected(_))
                    | (Membership::Rejected, verdict @ Verdict::Accepted(_)) => {
                        reconcile(store, &self.publisher, verdict);
                    }
                    _ => {}
                }
            }
        }
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("stores", &self.stores)
            .finish_non_exhaustive()
    }
}

fn classify(filter: &dyn Filter, meta: ObjectMeta) -> Verdict {
    if !meta.is_complete() {
        return Verdict::Skipped(meta);
    }
    if filter.apply(&meta, &meta.cluster) {
        Verdict::Accepted(meta)
    } else {
        Verdict::Rejected(meta)
    }
}

/// Applies a verdict to the store, publishing the key the transition calls for.
fn reconcile(
    store: &mut MembershipStore,
    publisher: &Publisher,
    verdict: Verdict,
) -> Option<Operation> {
    match verdict {
        Verdict::Accepted(meta) => {
            let op = match store.accept(meta.clone()) {
                Some(Membership::Accepted) => Operation::Update,
                Some(Membership::Rejected) | None => Operation::Add,
            };
            publisher.publish(ChangeKey::new(op, &meta));
            Some(op)
        }

        Verdict::Rejected(meta) => {
            info!(
                cluster = %meta.cluster,
                ns = %meta.namespace,
                name = %meta.name,
                object_type = %meta.object_type(),
                "Rejected by filter"
            );
            withdraw(store, publisher, meta)
        }

        Verdict::Skipped(meta) => {
            if store.membership(&meta.object_ref()).is_none() {
                debug!(
                    object_type = %meta.object_type(),
                    ns = %meta.namespace,
                    name = %meta.name,
                    "Hostname or IP not yet assigned"
                );
                return None;
            }
            debug!(
                object_type = %meta.object_type(),
                ns = %meta.namespace,
                name = %meta.name,
                "Hostname or IP removed"
            );
            withdraw(store, publisher, meta)
        }
    }
}

/// Stores a record as rejected. If it was accepted, the graph layer is told to delete it using
/// the previously accepted hostname.
fn withdraw(
    store: &mut MembershipStore,
    publisher: &Publisher,
    meta: ObjectMeta,
) -> Option<Operation> {
    let prior = store.reject(meta)?;
    publisher.publish(ChangeKey::new(Operation::Delete, &prior));
    Some(Operation::Delete)
}

// === impl Resource ===

impl Resource {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Service(_) => ObjectType::Service,
            Self::Ingress(_) => ObjectType::Ingress,
            Self::Route(_) => ObjectType::Route,
            Self::Namespace(_) => ObjectType::Namespace,
        }
    }

    fn namespace(&self) -> Option<String> {
        match self {
            Self::Service(svc) => svc.namespace(),
            Self::Ingress(ing) => ing.namespace(),
            Self::Route(route) => route.namespace(),
            Self::Namespace(ns) => ns.namespace(),
        }
    }

    fn name(&self) -> String {
        match self {
            Self::Service(svc) => svc.name_any(),
            Self::Ingress(ing) => ing.name_any(),
            Self::Route(route) => route.name_any(),
            Self::Namespace(ns) => ns.name_any(),
        }
    }
}

impl From<k8s::Service> for Resource {
    fn from(svc: k8s::Service) -> Self {
        Self::Service(svc)
    }
}

impl From<k8s::Ingress> for Resource {
    fn from(ing: k8s::Ingress) -> Self {
        Self::Ingress(ing)
    }
}

impl From<k8s::Route> for Resource {
    fn from(route: k8s::Route) -> Self {
        Self::Route(route)
    }
}

impl From<k8s::Namespace> for Resource {
    fn from(ns: k8s::Namespace) -> Self {
        Self::Namespace(ns)
    }
}
