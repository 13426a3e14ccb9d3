// dbvault/src/backup/retention.rs
use crate::storage::RemoteObject;

/// Picks the remote objects rotation should delete so that at most
/// `keep_count` objects survive in the folder.
///
/// The result is the oldest excess objects, oldest first, which is also the
/// order they are deleted in. Ordering is by last-modified time with object
/// id as tie-breaker, giving a total order and therefore deterministic
/// output for any input permutation. A `keep_count` of 0 selects everything.
///
/// Negative keep-counts never reach this function; the orchestrator rejects
/// them as a configuration error before any remote call is made.
pub fn select_for_deletion(
    mut objects: Vec<RemoteObject>,
    keep_count: usize,
) -> Vec<RemoteObject> {
    if objects.len() <= keep_count {
        return Vec::new();
    }
    objects.sort_by(|a, b| {
        a.last_modified
            .cmp(&b.last_modified)
            .then_with(|| a.id.cmp(&b.id))
    });
    let excess = objects.len() - keep_count;
    objects.truncate(excess);
    objects
}
