//! Multi-source reachability.
//!
//! `are_connected_any(sources, targets)` answers "can any source reach any
//! target by following zero or more directed edges?". Zero hops count: a
//! source that is itself a target is a hit before any edge is followed.

use std::collections::{BTreeSet, HashSet};

use super::{Graph, VertexId};

impl<V, E> Graph<V, E> {
    /// `true` iff some vertex reachable from `sources` is in `targets`.
    ///
    /// Frontier search: pop a frontier vertex, test it against `targets`,
    /// then push its unvisited successors. The answer does not depend on the
    /// order in which frontier vertices are popped.
    ///
    /// # Panics
    ///
    /// Panics if either set is empty or a source is not a live vertex.
    #[track_caller]
    #[must_use]
    pub fn are_connected_any(
        &self,
        sources: &BTreeSet<VertexId>,
        targets: &BTreeSet<VertexId>,
    ) -> bool {
        assert!(!sources.is_empty(), "are_connected_any needs at least one source");
        assert!(!targets.is_empty(), "are_connected_any needs at least one target");

        let mut frontier = sources.clone();
        let mut visited: HashSet<VertexId> = HashSet::new();

        while let Some(vertex) = frontier.pop_first() {
            if targets.contains(&vertex) {
                return true;
            }
            visited.insert(vertex);

            for next in self.successors(vertex) {
                if !visited.contains(&next) {
                    frontier.insert(next);
                }
            }
        }

        false
    }

    /// Convenience form of [`Graph::are_connected_any`] for a single pair.
    #[track_caller]
    #[must_use]
    pub fn is_reachable(&self, src: VertexId, dst: VertexId) -> bool {
        self.are_connected_any(&BTreeSet::from([src]), &BTreeSet::from([dst]))
    }
}
