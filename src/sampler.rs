//! Visibility sampling.

use crate::host::{ResourceId, Workspace};
use hashbrown::HashSet;

/// Collect the set of resources currently shown on some surface and backed
/// by a storage path.
///
/// Pure query with no caching; every reconciliation pass calls this fresh.
/// Several surfaces showing the same resource collapse to one entry. Cost is
/// proportional to the number of open surfaces, which is assumed small.
pub fn sample_visible<W: Workspace>(workspace: &W) -> HashSet<ResourceId> {
    let mut visible = HashSet::new();
    for surface in workspace.visible_surfaces() {
        let Some(resource) = workspace.surface_resource(surface) else {
            continue;
        };
        if workspace.backing_path(resource).is_some() {
            visible.insert(resource);
        }
    }
    visible
}
