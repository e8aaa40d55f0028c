//! A label-based admission filter.

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use gslb_controller_core::{Filter, ObjectMeta};
use gslb_controller_k8s_api::Selector;
use parking_lot::RwLock;
use std::sync::Arc;

/// Admits objects from member clusters that either match an object label selector or live in a
/// namespace matching a namespace label selector.
///
/// With neither selector configured, nothing is admitted.
#[derive(Debug)]
pub struct LabelFilter {
    clusters: HashSet<String>,
    objects: Option<Selector>,
    namespaces: Option<Selector>,

    /// The names of selected namespaces, per cluster.
    selected: RwLock<HashMap<Arc<str>, HashSet<String>>>,
}

// === impl LabelFilter ===

impl LabelFilter {
    pub fn new(
        clusters: impl IntoIterator<Item = impl ToString>,
        objects: Option<Selector>,
        namespaces: Option<Selector>,
    ) -> Self {
        Self {
            clusters: clusters.into_iter().map(|c| c.to_string()).collect(),
            objects: objects.filter(|s| !s.is_empty()),
            namespaces: namespaces.filter(|s| !s.is_empty()),
            selected: RwLock::default(),
        }
    }

    fn is_member(&self, cluster: &str) -> bool {
        self.clusters.contains(cluster)
    }
}

impl Filter for LabelFilter {
    fn apply(&self, meta: &ObjectMeta, cluster: &str) -> bool {
        if !self.is_member(cluster) {
            return false;
        }
        if let Some(objects) = &self.objects {
            if objects.matches(&meta.labels) {
                return true;
            }
        }
        self.selected
            .read()
            .get(cluster)
            .is_some_and(|names| names.contains(&meta.namespace))
    }

    fn apply_namespace(&self, ns: &ObjectMeta) -> bool {
        self.is_member(&ns.cluster)
            && self
                .namespaces
                .as_ref()
                .is_some_and(|selector| selector.matches(&ns.labels))
    }

    fn update_namespace(&self, _old: Option<&ObjectMeta>, new: &ObjectMeta) -> bool {
        let selected = self.apply_namespace(new);
        let mut by_cluster = self.selected.write();
        if selected {
            by_cluster
                .entry(new.cluster.clone())
                .or_default()
                .insert(new.name.clone())
        } else {
            remove(&mut by_cluster, &new.cluster, &new.name)
        }
    }

    fn remove_namespace(&self, ns: &ObjectMeta) -> bool {
        remove(&mut self.selected.write(), &ns.cluster, &ns.name)
    }
}

fn remove(by_cluster: &mut HashMap<Arc<str>, HashSet<String>>, cluster: &str, name: &str) -> bool {
    let Some(names) = by_cluster.get_mut(cluster) else {
        return false;
    };
    let removed = names.remove(name);
    if names.is_empty() {
        by_cluster.remove(cluster);
    }
    removed
}
