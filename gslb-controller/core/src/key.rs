use crate::{ObjectMeta, ObjectType};
use std::{fmt, sync::Arc};

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Operation {
    Add,
    Update,
    Delete,
}

/// Notifies the graph layer that an object's externally-visible state changed.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ChangeKey {
    pub op: Operation,
    pub object_type: ObjectType,
    pub cluster: Arc<str>,
    pub namespace: String,
    pub name: String,

    /// Determines the queue shard. Not part of the key's identity downstream.
    pub hostname: String,
}

// === impl Operation ===

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl ChangeKey ===

impl ChangeKey {
    pub fn new(op: Operation, meta: &ObjectMeta) -> Self {
        Self {
            op,
            object_type: meta.object_type(),
            cluster: meta.cluster.clone(),
            namespace: meta.namespace.clone(),
            name: meta.name.clone(),
            hostname: meta.hostname.clone(),
        }
    }

    /// Returns true if `other` refers to the same object, regardless of operation.
    pub fn same_target(&self, other: &Self) -> bool {
        self.object_type == other.object_type
            && self.cluster == other.cluster
            && self.namespace == other.namespace
            && self.name == other.name
    }
}

/// Formats the key as `OP/Type/cluster/namespace/name`.
impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.op, self.object_type, self.cluster, self.namespace, self.name
        )
    }
}
