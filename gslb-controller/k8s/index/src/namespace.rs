use crate::{extract, Error, Index};
use gslb_controller_k8s_api as k8s;
use std::sync::Arc;
use tracing::{debug, instrument};

impl Index {
    /// Records a namespace with the filter and re-evaluates the cluster's objects.
    ///
    /// The namespace's own membership is re-derived from the filter's current verdict.
    #[instrument(skip_all, fields(%cluster, name = ns.metadata.name.as_deref()))]
    pub(crate) fn apply_namespace(
        &mut self,
        cluster: &Arc<str>,
        old: Option<k8s::Namespace>,
        ns: k8s::Namespace,
    ) -> Result<(), Error> {
        let meta = extract::namespace(&ns, cluster)?;
        let unchanged = self
            .stores
            .namespaces
            .get(&meta.object_ref())
            .is_some_and(|(_, prior)| prior.checksum == meta.checksum);
        if unchanged {
            debug!("Unchanged");
            return Ok(());
        }

        let old = old
            .map(|ns| extract::namespace(&ns, cluster))
            .transpose()?;
        if self.filter().update_namespace(old.as_ref(), &meta) {
            debug!("Namespace selection changed");
        }

        if self.filter().apply_namespace(&meta) {
            self.stores.namespaces.accept(meta);
        } else {
            self.stores.namespaces.reject(meta);
        }

        self.reevaluate(cluster);
        Ok(())
    }

    #[instrument(skip_all, fields(%cluster, name = ns.metadata.name.as_deref()))]
    pub(crate) fn delete_namespace(
        &mut self,
        cluster: &Arc<str>,
        ns: k8s::Namespace,
    ) -> Result<(), Error> {
        let meta = extract::namespace(&ns, cluster)?;
        if self.filter().remove_namespace(&meta) {
            debug!("Namespace selection changed");
        }
        self.stores.namespaces.remove(&meta.object_ref());

        self.reevaluate(cluster);
        Ok(())
    }
}
