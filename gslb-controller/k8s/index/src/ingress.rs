use crate::{extract, Error, Index};
use gslb_controller_core::{Kind, ObjectMeta, ObjectType};
use gslb_controller_k8s_api as k8s;
use std::sync::Arc;
use tracing::{debug, instrument};

impl Index {
    /// Diffs the ingress's host rules against the hosts already tracked for it.
    ///
    /// Hosts that are no longer ruled are removed before new and changed hosts are classified.
    #[instrument(
        skip_all,
        fields(
            %cluster,
            ns = ing.metadata.namespace.as_deref(),
            name = ing.metadata.name.as_deref(),
        )
    )]
    pub(crate) fn apply_ingress(
        &mut self,
        cluster: &Arc<str>,
        ing: k8s::Ingress,
    ) -> Result<(), Error> {
        let (ns, name) = extract::names(&ing)?;
        let hosts = extract::ingress_hosts(&ing, cluster)?;
        if hosts.is_empty() {
            debug!("No host rules");
        }

        let stale = self.ingress_hosts(cluster, &ns, &name, |meta| {
            !hosts.iter().any(|host| host.name == meta.name)
        });
        for meta in stale {
            self.forget(ObjectType::Ingress, &meta.object_ref());
        }

        for meta in hosts {
            self.observe(meta);
        }
        Ok(())
    }

    #[instrument(
        skip_all,
        fields(
            %cluster,
            ns = ing.metadata.namespace.as_deref(),
            name = ing.metadata.name.as_deref(),
        )
    )]
    pub(crate) fn delete_ingress(
        &mut self,
        cluster: &Arc<str>,
        ing: k8s::Ingress,
    ) -> Result<(), Error> {
        let (ns, name) = extract::names(&ing)?;
        for meta in self.ingress_hosts(cluster, &ns, &name, |_| true) {
            self.forget(ObjectType::Ingress, &meta.object_ref());
        }
        Ok(())
    }

    /// Returns the tracked hosts of an ingress that satisfy `f`.
    fn ingress_hosts(
        &self,
        cluster: &str,
        ns: &str,
        name: &str,
        f: impl Fn(&ObjectMeta) -> bool,
    ) -> Vec<ObjectMeta> {
        self.stores.ingresses.find(cluster, ns, |meta| {
            matches!(&meta.kind, Kind::IngressHost { ingress, .. } if ingress == name) && f(meta)
        })
    }
}
