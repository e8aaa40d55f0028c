use crate::{extract, Error, Index};
use gslb_controller_core::{ObjectRef, ObjectType};
use gslb_controller_k8s_api as k8s;
use std::sync::Arc;
use tracing::instrument;

impl Index {
    #[instrument(
        skip_all,
        fields(
            %cluster,
            ns = route.metadata.namespace.as_deref(),
            name = route.metadata.name.as_deref(),
        )
    )]
    pub(crate) fn apply_route(
        &mut self,
        cluster: &Arc<str>,
        route: k8s::Route,
    ) -> Result<(), Error> {
        let meta = extract::route(&route, cluster)?;
        self.observe(meta);
        Ok(())
    }

    #[instrument(
        skip_all,
        fields(
            %cluster,
            ns = route.metadata.namespace.as_deref(),
            name = route.metadata.name.as_deref(),
        )
    )]
    pub(crate) fn delete_route(
        &mut self,
        cluster: &Arc<str>,
        route: k8s::Route,
    ) -> Result<(), Error> {
        let (ns, name) = extract::names(&route)?;
        self.forget(ObjectType::Route, &ObjectRef::new(cluster.clone(), ns, name));
        Ok(())
    }
}
