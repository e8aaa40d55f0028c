use std::{collections::BTreeMap, fmt, sync::Arc};

pub type Labels = BTreeMap<String, String>;

/// The object types whose changes are published to the graph layer.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ObjectType {
    Service,
    Ingress,
    Route,
    Namespace,
}

/// Kind-specific identity of a metadata record.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Kind {
    Service,

    /// A single host rule of an ingress. An ingress yields one of these per host.
    IngressHost { ingress: String, host: String },

    Route,

    Namespace,
}

/// Identifies a record within a membership store.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectRef {
    pub cluster: Arc<str>,
    pub namespace: String,
    pub name: String,
}

/// The traffic-relevant parts of a cluster object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectMeta {
    pub kind: Kind,
    pub cluster: Arc<str>,
    pub namespace: String,
    pub name: String,

    /// The virtual host advertised by this object. Empty until assigned.
    pub hostname: String,

    /// The VIP serving `hostname`. Empty until assigned.
    pub ip: String,

    pub labels: Labels,

    /// Fingerprint of every field above.
    pub checksum: u64,
}

// === impl ObjectType ===

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "Service",
            Self::Ingress => "Ingress",
            Self::Route => "Route",
            Self::Namespace => "Namespace",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl Kind ===

impl Kind {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Service => ObjectType::Service,
            Self::IngressHost { .. } => ObjectType::Ingress,
            Self::Route => ObjectType::Route,
            Self::Namespace => ObjectType::Namespace,
        }
    }
}

// === impl ObjectRef ===

impl ObjectRef {
    pub fn new(
        cluster: impl Into<Arc<str>>,
        namespace: impl ToString,
        name: impl ToString,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.cluster, self.namespace, self.name)
    }
}

// === impl ObjectMeta ===

impl ObjectMeta {
    pub fn new(
        kind: Kind,
        cluster: impl Into<Arc<str>>,
        namespace: impl ToString,
        name: impl ToString,
        hostname: impl ToString,
        ip: impl ToString,
        labels: Labels,
    ) -> Self {
        let mut meta = Self {
            kind,
            cluster: cluster.into(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            hostname: hostname.to_string(),
            ip: ip.to_string(),
            labels,
            checksum: 0,
        };
        meta.checksum = crate::checksum(&(
            &meta.kind,
            &*meta.cluster,
            &meta.namespace,
            &meta.name,
            &meta.hostname,
            &meta.ip,
            &meta.labels,
        ));
        meta
    }

    /// Builds the record for an ingress host rule, keyed as `<ingress>/<host>`.
    pub fn ingress_host(
        cluster: impl Into<Arc<str>>,
        namespace: impl ToString,
        ingress: impl ToString,
        host: impl ToString,
        ip: impl ToString,
        labels: Labels,
    ) -> Self {
        let ingress = ingress.to_string();
        let host = host.to_string();
        let name = format!("{ingress}/{host}");
        Self::new(
            Kind::IngressHost {
                ingress,
                host: host.clone(),
            },
            cluster,
            namespace,
            name,
            // An ingress host only advertises a hostname once the load balancer has reported it.
            if ip.to_string().is_empty() {
                String::new()
            } else {
                host
            },
            ip,
            labels,
        )
    }

    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            cluster: self.cluster.clone(),
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    /// Returns true when the object has everything needed to be placed in traffic.
    pub fn is_complete(&self) -> bool {
        matches!(self.kind, Kind::Namespace) || !(self.hostname.is_empty() || self.ip.is_empty())
    }
}
