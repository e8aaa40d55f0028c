use crate::ObjectMeta;

/// Decides whether objects participate in global traffic distribution.
///
/// Namespace membership is itself mutable filter state: namespace events record or forget a
/// namespace via [`Filter::update_namespace`] and [`Filter::remove_namespace`], which may change
/// the verdict for every object in that namespace.
pub trait Filter: Send + Sync {
    /// Returns true if the object, observed in `cluster`, is admitted.
    ///
    /// Only called with complete metadata.
    fn apply(&self, meta: &ObjectMeta, cluster: &str) -> bool;

    /// Returns the current verdict for a namespace.
    fn apply_namespace(&self, ns: &ObjectMeta) -> bool;

    /// Records a namespace (or its new labels). Returns true if the filter's namespace state
    /// changed.
    fn update_namespace(&self, old: Option<&ObjectMeta>, new: &ObjectMeta) -> bool;

    /// Forgets a namespace. Returns true if the filter's namespace state changed.
    fn remove_namespace(&self, ns: &ObjectMeta) -> bool;
}
