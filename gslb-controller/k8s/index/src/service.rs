use crate::{
    extract::{self, Extracted},
    Error, Index,
};
use gslb_controller_core::{ObjectRef, ObjectType};
use gslb_controller_k8s_api as k8s;
use std::sync::Arc;
use tracing::{debug, instrument};

impl Index {
    #[instrument(
        skip_all,
        fields(
            %cluster,
            ns = svc.metadata.namespace.as_deref(),
            name = svc.metadata.name.as_deref(),
        )
    )]
    pub(crate) fn apply_service(
        &mut self,
        cluster: &Arc<str>,
        svc: k8s::Service,
    ) -> Result<(), Error> {
        match extract::service(&svc, cluster)? {
            Extracted::Meta(meta) => {
                self.observe(meta);
            }
            Extracted::NotLoadBalancer => {
                // The service may have been a load balancer before this update.
                let (ns, name) = extract::names(&svc)?;
                let key = ObjectRef::new(cluster.clone(), ns, name);
                if self.forget(ObjectType::Service, &key).is_none() {
                    debug!("Ignoring service that is not of type LoadBalancer");
                }
            }
        }
        Ok(())
    }

    #[instrument(
        skip_all,
        fields(
            %cluster,
            ns = svc.metadata.namespace.as_deref(),
            name = svc.metadata.name.as_deref(),
        )
    )]
    pub(crate) fn delete_service(
        &mut self,
        cluster: &Arc<str>,
        svc: k8s::Service,
    ) -> Result<(), Error> {
        let (ns, name) = extract::names(&svc)?;
        self.forget(ObjectType::Service, &ObjectRef::new(cluster.clone(), ns, name));
        Ok(())
    }
}
