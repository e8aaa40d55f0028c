//! Reduces cluster objects to the metadata the engine classifies.

use crate::Error;
use gslb_controller_core::{Kind, Labels, ObjectMeta};
use gslb_controller_k8s_api::{self as k8s, ResourceExt};
use std::{collections::BTreeSet, net::IpAddr, sync::Arc};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Extracted {
    Meta(ObjectMeta),

    /// Only `LoadBalancer` services can carry global traffic.
    NotLoadBalancer,
}

/// Returns the object's namespace and name.
pub(crate) fn names<K: ResourceExt>(obj: &K) -> Result<(String, String), Error> {
    let name = obj
        .meta()
        .name
        .clone()
        .ok_or_else(|| Error::MalformedEvent("object has no name".to_string()))?;
    let ns = obj
        .namespace()
        .ok_or_else(|| Error::MalformedEvent(format!("{name} has no namespace")))?;
    Ok((ns, name))
}

pub(crate) fn service(svc: &k8s::Service, cluster: &Arc<str>) -> Result<Extracted, Error> {
    let (ns, name) = names(svc)?;

    let lb = svc.spec.as_ref().and_then(|spec| spec.type_.as_deref()) == Some("LoadBalancer");
    if !lb {
        return Ok(Extracted::NotLoadBalancer);
    }

    let status = svc
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .and_then(|ingress| ingress.first());
    let hostname = status
        .and_then(|lb| lb.hostname.clone())
        .unwrap_or_default();
    let ip = status.and_then(|lb| lb.ip.clone()).unwrap_or_default();

    Ok(Extracted::Meta(ObjectMeta::new(
        Kind::Service,
        cluster.clone(),
        ns,
        name,
        hostname,
        ip,
        labels(svc),
    )))
}

/// Returns one record per distinct host rule.
pub(crate) fn ingress_hosts(
    ing: &k8s::Ingress,
    cluster: &Arc<str>,
) -> Result<Vec<ObjectMeta>, Error> {
    let (ns, name) = names(ing)?;

    let hosts = ing
        .spec
        .iter()
        .flat_map(|spec| spec.rules.iter().flatten())
        .filter_map(|rule| rule.host.as_deref())
        .filter(|host| !host.is_empty())
        .collect::<BTreeSet<_>>();

    let status = ing
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_deref())
        .unwrap_or_default();

    let labels = labels(ing);
    Ok(hosts
        .into_iter()
        .map(|host| {
            let ip = status
                .iter()
                .find(|lb| lb.hostname.as_deref() == Some(host))
                .and_then(|lb| lb.ip.clone())
                .unwrap_or_default();
            ObjectMeta::ingress_host(cluster.clone(), &ns, &name, host, ip, labels.clone())
        })
        .collect())
}

pub(crate) fn route(route: &k8s::Route, cluster: &Arc<str>) -> Result<ObjectMeta, Error> {
    let (ns, name) = names(route)?;

    // The load balancer integration records the VIP as the message of the admitted condition.
    let ip = route
        .status
        .iter()
        .flat_map(|status| status.ingress.iter())
        .flat_map(|ingress| ingress.conditions.iter())
        .filter(|cond| cond.is_admitted())
        .filter_map(|cond| cond.message.as_deref())
        .find_map(|msg| msg.trim().parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
        .unwrap_or_default();

    Ok(ObjectMeta::new(
        Kind::Route,
        cluster.clone(),
        ns,
        name,
        route.spec.host.clone().unwrap_or_default(),
        ip,
        labels(route),
    ))
}

pub(crate) fn namespace(ns: &k8s::Namespace, cluster: &Arc<str>) -> Result<ObjectMeta, Error> {
    let name = ns
        .metadata
        .name
        .clone()
        .ok_or_else(|| Error::MalformedEvent("namespace has no name".to_string()))?;
    Ok(ObjectMeta::new(
        Kind::Namespace,
        cluster.clone(),
        "",
        name,
        "",
        "",
        labels(ns),
    ))
}

fn labels<K: ResourceExt>(obj: &K) -> Labels {
    obj.labels().clone()
}
