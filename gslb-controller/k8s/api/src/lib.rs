#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod labels;
pub mod route;
pub mod watch;

pub use self::{
    labels::Selector,
    route::Route,
    watch::{Cache, Event},
};
pub use k8s_openapi::api::{
    self,
    core::v1::{
        LoadBalancerIngress, LoadBalancerStatus, Namespace, Service, ServiceSpec, ServiceStatus,
    },
    networking::v1::{
        Ingress, IngressLoadBalancerIngress, IngressLoadBalancerStatus, IngressRule, IngressSpec,
        IngressStatus,
    },
};
pub use kube::{
    api::{Api, ObjectMeta, Resource, ResourceExt},
    runtime::watcher,
    Client,
};
