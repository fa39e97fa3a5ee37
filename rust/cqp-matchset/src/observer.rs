/// Receives notifications about structural changes of a named range set.
///
/// Hosts use this to invalidate cached views or mark the subcorpus as
/// modified (needing to be saved again).
pub trait MutationObserver: Send + Sync {
    /// Called after the range set `name` has been structurally modified.
    fn touched(&self, name: &str);
}
