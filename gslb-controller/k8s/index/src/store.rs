use ahash::AHashMap as HashMap;
use gslb_controller_core::{ObjectMeta, ObjectRef, ObjectType};
use std::sync::Arc;

/// Whether a tracked object currently passes the admission filter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Membership {
    Accepted,
    Rejected,
}

/// The accepted and rejected tables for a single object type.
///
/// A key is in at most one of the two tables. Every mutation that moves a key removes it from one
/// table before inserting it into the other.
#[derive(Debug, Default)]
pub struct MembershipStore {
    accepted: Table,
    rejected: Table,
}

/// One `MembershipStore` per object type.
#[derive(Debug, Default)]
pub(crate) struct Stores {
    pub services: MembershipStore,
    pub ingresses: MembershipStore,
    pub routes: MembershipStore,
    pub namespaces: MembershipStore,
}

/// cluster -> namespace -> name -> metadata
#[derive(Debug, Default)]
struct Table(HashMap<Arc<str>, HashMap<String, HashMap<String, ObjectMeta>>>);

// === impl Stores ===

impl Stores {
    pub(crate) fn get(&self, object_type: ObjectType) -> &MembershipStore {
        match object_type {
            ObjectType::Service => &self.services,
            ObjectType::Ingress => &self.ingresses,
            ObjectType::Route => &self.routes,
            ObjectType::Namespace => &self.namespaces,
        }
    }

    pub(crate) fn get_mut(&mut self, object_type: ObjectType) -> &mut MembershipStore {
        match object_type {
            ObjectType::Service => &mut self.services,
            ObjectType::Ingress => &mut self.ingresses,
            ObjectType::Route => &mut self.routes,
            ObjectType::Namespace => &mut self.namespaces,
        }
    }
}

// === impl MembershipStore ===

impl MembershipStore {
    pub fn get(&self, key: &ObjectRef) -> Option<(Membership, &ObjectMeta)> {
        if let Some(meta) = self.accepted.get(key) {
            return Some((Membership::Accepted, meta));
        }
        self.rejected
            .get(key)
            .map(|meta| (Membership::Rejected, meta))
    }

    pub fn membership(&self, key: &ObjectRef) -> Option<Membership> {
        self.get(key).map(|(m, _)| m)
    }

    pub fn accepted(&self, key: &ObjectRef) -> Option<&ObjectMeta> {
        self.accepted.get(key)
    }

    pub fn rejected(&self, key: &ObjectRef) -> Option<&ObjectMeta> {
        self.rejected.get(key)
    }

    /// Stores `meta` as accepted, returning the key's prior membership.
    pub(crate) fn accept(&mut self, meta: ObjectMeta) -> Option<Membership> {
        let key = meta.object_ref();
        let prior = if self.rejected.remove(&key).is_some() {
            Some(Membership::Rejected)
        } else if self.accepted.contains(&key) {
            Some(Membership::Accepted)
        } else {
            None
        };
        self.accepted.insert(key.clone(), meta);
        self.check_exclusive(&key);
        prior
    }

    /// Stores `meta` as rejected, returning the previously accepted metadata, if any.
    pub(crate) fn reject(&mut self, meta: ObjectMeta) -> Option<ObjectMeta> {
        let key = meta.object_ref();
        let prior = self.accepted.remove(&key);
        self.rejected.insert(key.clone(), meta);
        self.check_exclusive(&key);
        prior
    }

    /// Removes a key from whichever table holds it.
    pub(crate) fn remove(&mut self, key: &ObjectRef) -> Option<(Membership, ObjectMeta)> {
        let accepted = self.accepted.remove(key);
        let rejected = self.rejected.remove(key);
        match (accepted, rejected) {
            (Some(meta), None) => Some((Membership::Accepted, meta)),
            (None, Some(meta)) => Some((Membership::Rejected, meta)),
            (None, None) => None,
            (Some(meta), Some(_)) => {
                inconsistent(key);
                Some((Membership::Accepted, meta))
            }
        }
    }

    /// Returns all of a cluster's entries, in key order.
    pub(crate) fn entries(&self, cluster: &str) -> Vec<(Membership, ObjectMeta)> {
        let mut entries = self
            .accepted
            .cluster(cluster)
            .map(|meta| (Membership::Accepted, meta.clone()))
            .chain(
                self.rejected
                    .cluster(cluster)
                    .map(|meta| (Membership::Rejected, meta.clone())),
            )
            .collect::<Vec<_>>();
        entries.sort_by(|(_, a), (_, b)| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        entries
    }

    /// Returns the entries in a cluster's namespace that satisfy `f`, in name order.
    pub(crate) fn find(
        &self,
        cluster: &str,
        namespace: &str,
        f: impl Fn(&ObjectMeta) -> bool,
    ) -> Vec<ObjectMeta> {
        let mut found = self
            .accepted
            .namespace(cluster, namespace)
            .chain(self.rejected.namespace(cluster, namespace))
            .filter(|meta| f(meta))
            .cloned()
            .collect::<Vec<_>>();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    /// Returns the number of entries with the given membership in each cluster.
    pub fn sizes(&self, membership: Membership) -> Vec<(Arc<str>, usize)> {
        let table = match membership {
            Membership::Accepted => &self.accepted,
            Membership::Rejected => &self.rejected,
        };
        table
            .0
            .iter()
            .map(|(cluster, by_ns)| {
                let size = by_ns.values().map(|by_name| by_name.len()).sum::<usize>();
                (cluster.clone(), size)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_exclusive(&self, key: &ObjectRef) {
        if self.accepted.contains(key) && self.rejected.contains(key) {
            inconsistent(key);
        }
    }
}

fn inconsistent(key: &ObjectRef) {
    let error = crate::Error::StoreInconsistency(key.clone());
    tracing::error!(%error);
    debug_assert!(false, "{error}");
}

// === impl Table ===

impl Table {
    fn get(&self, key: &ObjectRef) -> Option<&ObjectMeta> {
        self.0.get(&key.cluster)?.get(&key.namespace)?.get(&key.name)
    }

    fn contains(&self, key: &ObjectRef) -> bool {
        self.get(key).is_some()
    }

    fn insert(&mut self, key: ObjectRef, meta: ObjectMeta) {
        self.0
            .entry(key.cluster)
            .or_default()
            .entry(key.namespace)
            .or_default()
            .insert(key.name, meta);
    }

    /// Removes an entry, dropping namespace and cluster maps that become empty.
    fn remove(&mut self, key: &ObjectRef) -> Option<ObjectMeta> {
        let by_ns = self.0.get_mut(&key.cluster)?;
        let by_name = by_ns.get_mut(&key.namespace)?;
        let meta = by_name.remove(&key.name)?;
        if by_name.is_empty() {
            by_ns.remove(&key.namespace);
            if by_ns.is_empty() {
                self.0.remove(&key.cluster);
            }
        }
        Some(meta)
    }

    fn cluster(&self, cluster: &str) -> impl Iterator<Item = &ObjectMeta> {
        self.0
            .get(cluster)
            .into_iter()
            .flat_map(|by_ns| by_ns.values())
            .flat_map(|by_name| by_name.values())
    }

    fn namespace<'a>(
        &'a self,
        cluster: &str,
        namespace: &str,
    ) -> impl Iterator<Item = &'a ObjectMeta> {
        self.0
            .get(cluster)
            .and_then(|by_ns| by_ns.get(namespace))
            .into_iter()
            .flat_map(|by_name| by_name.values())
    }

    fn len(&self) -> usize {
        self.0
            .values()
            .flat_map(|by_ns| by_ns.values())
            .map(|by_name| by_name.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gslb_controller_core::{Kind, Labels};

    fn mk_meta(name: &str, ip: &str) -> ObjectMeta {
        ObjectMeta::new(
            Kind::Service,
            "c1",
            "ns-0",
            name,
            format!("{name}.example.com"),
            ip,
            Labels::default(),
        )
    }

    #[test]
    fn moves_between_tables() {
        let mut store = MembershipStore::default();
        let meta = mk_meta("svc-0", "10.0.0.1");
        let key = meta.object_ref();

        assert_eq!(store.reject(meta.clone()), None);
        assert_eq!(store.membership(&key), Some(Membership::Rejected));

        assert_eq!(store.accept(meta.clone()), Some(Membership::Rejected));
        assert_eq!(store.membership(&key), Some(Membership::Accepted));
        assert!(store.rejected(&key).is_none());

        let updated = mk_meta("svc-0", "10.0.0.2");
        assert_eq!(store.accept(updated.clone()), Some(Membership::Accepted));
        assert_eq!(store.accepted(&key), Some(&updated));

        assert_eq!(store.reject(meta), Some(updated));
        assert!(store.accepted(&key).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_prunes_empty_maps() {
        let mut store = MembershipStore::default();
        let meta = mk_meta("svc-0", "10.0.0.1");
        store.accept(meta.clone());
        assert_eq!(store.sizes(Membership::Accepted), vec![("c1".into(), 1)]);

        assert_eq!(
            store.remove(&meta.object_ref()),
            Some((Membership::Accepted, meta.clone()))
        );
        assert_eq!(store.remove(&meta.object_ref()), None);
        assert!(store.sizes(Membership::Accepted).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn entries_are_ordered() {
        let mut store = MembershipStore::default();
        store.accept(mk_meta("svc-b", "10.0.0.2"));
        store.reject(mk_meta("svc-a", "10.0.0.1"));
        store.accept(mk_meta("svc-c", "10.0.0.3"));

        let names = store
            .entries("c1")
            .into_iter()
            .map(|(m, meta)| (m, meta.name))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                (Membership::Rejected, "svc-a".to_string()),
                (Membership::Accepted, "svc-b".to_string()),
                (Membership::Accepted, "svc-c".to_string()),
            ]
        );
        assert!(store.entries("c2").is_empty());
    }
}
