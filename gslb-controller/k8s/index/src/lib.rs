//! GSLB member-cluster index
//!
//! Every member cluster's `Service`, `Ingress`, `Route` and `Namespace` events are classified
//! against an admission [`Filter`](gslb_controller_core::Filter). Each object type has a
//! [`MembershipStore`] holding two tables, accepted and rejected, keyed by
//! `(cluster, namespace, name)`. When an event changes what the graph layer should see, the index
//! publishes a [`ChangeKey`](gslb_controller_core::ChangeKey) to the hostname-sharded queues.
//!
//! - A `Service` is tracked only when it is of type `LoadBalancer`. Its hostname and VIP are read
//!   from its load balancer status.
//! - An `Ingress` is tracked per host rule, so a single ingress may contribute several records.
//!   Updates are diffed host-by-host.
//! - A `Route` takes its hostname from its spec and its VIP from its admitted condition.
//! - A `Namespace` is never published. A namespace change may alter the filter's verdict for
//!   every object in the cluster, so each namespace event re-evaluates the cluster's records.
//!
//! ```text
//! [ watch ] -> [ Index ] -> accepted/rejected stores
//!                  |
//!                  +-> [ Publisher ] -> shard(hostname) -> graph layer
//! ```
//!
//! All event handling happens under the index's write lock and never awaits, so each event's
//! read-classify-write sequence is atomic with respect to every other event.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod cluster;
mod extract;
pub mod filter;
mod index;
mod ingress;
pub mod metrics;
mod namespace;
mod route;
mod service;
mod store;


pub use self::{
    cluster::ClusterIndex,
    filter::LabelFilter,
    index::{Index, Resource, SharedIndex},
    store::{Membership, MembershipStore},
};
use gslb_controller_core::ObjectRef;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("{0} is both accepted and rejected")]
    StoreInconsistency(ObjectRef),
}
