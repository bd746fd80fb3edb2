//! Cycle detection for directed graphs.
//!
//! # Design
//!
//! - **Three-color DFS**: a vertex is unvisited, *on stack* (on the active
//!   DFS path) or *done* (fully explored, no cycle reachable from it). An
//!   edge into an on-stack vertex is a back edge and closes a cycle.
//! - **Explicit stack**: the DFS keeps `(vertex, successors, cursor)` frames
//!   in a `Vec` instead of recursing, so long paths cannot exhaust the call
//!   stack. The on-stack and done sets live in [`CycleSearch`] where tests
//!   can inspect them.
//! - **Shared state across roots**: one [`CycleSearch`] can be seeded from
//!   many roots. Vertices finished by an earlier root short-circuit later
//!   searches, so a whole-graph scan stays O(V+E).
//!
//! A self-loop is a back edge onto the vertex itself and is reported as the
//! cycle `[v, v]`.

use std::collections::HashSet;

use super::{Graph, VertexId};

/// Reusable DFS state for cycle detection.
///
/// When [`CycleSearch::search_from`] reports a cycle, the vertices of the
/// aborted path are dropped from the on-stack set and count as unvisited
/// again. Done vertices stay done, so the same search can be seeded from
/// further roots.
#[derive(Debug, Clone, Default)]
pub struct CycleSearch {
    on_stack: HashSet<VertexId>,
    done: HashSet<VertexId>,
}

#[derive(Debug)]
struct Frame {
    vertex: VertexId,
    successors: Vec<VertexId>,
    cursor: usize,
}

impl CycleSearch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertices on the active DFS path.
    #[must_use]
    pub const fn on_stack(&self) -> &HashSet<VertexId> {
        &self.on_stack
    }

    /// Vertices fully explored without finding a cycle.
    #[must_use]
    pub const fn done(&self) -> &HashSet<VertexId> {
        &self.done
    }

    /// Depth-first search from `root`.
    ///
    /// Returns the first cycle found as a closed path `[u, …, u]`, or `None`
    /// when no cycle is reachable from `root`. A root that is already done
    /// returns `None` without traversing anything.
    ///
    /// # Panics
    ///
    /// Panics if `root` is not a live vertex of `graph`.
    pub fn search_from<V, E>(
        &mut self,
        graph: &Graph<V, E>,
        root: VertexId,
    ) -> Option<Vec<VertexId>> {
        if self.done.contains(&root) {
            return None;
        }

        let mut stack: Vec<Frame> = Vec::new();
        self.enter(graph, root, &mut stack);

        while let Some(frame) = stack.last_mut() {
            let Some(&next) = frame.successors.get(frame.cursor) else {
                let vertex = frame.vertex;
                stack.pop();
                self.on_stack.remove(&vertex);
                let first_visit = self.done.insert(vertex);
                debug_assert!(first_visit, "{vertex} finished twice");
                continue;
            };
            frame.cursor += 1;

            if self.done.contains(&next) {
                continue;
            }
            if self.on_stack.contains(&next) {
                let cycle = closed_path(&stack, next);
                self.on_stack.clear();
                return Some(cycle);
            }
            self.enter(graph, next, &mut stack);
        }

        None
    }

    fn enter<V, E>(&mut self, graph: &Graph<V, E>, vertex: VertexId, stack: &mut Vec<Frame>) {
        self.on_stack.insert(vertex);
        stack.push(Frame {
            vertex,
            successors: graph.out_vertices(vertex),
            cursor: 0,
        });
    }
}

/// Path from the on-stack `target` down to the top frame, closed back to `target`.
fn closed_path(stack: &[Frame], target: VertexId) -> Vec<VertexId> {
    let Some(start) = stack.iter().position(|frame| frame.vertex == target) else {
        unreachable!("on-stack vertex {target} has no dfs frame");
    };
    let mut path: Vec<VertexId> = stack[start..].iter().map(|frame| frame.vertex).collect();
    path.push(target);
    path
}

impl<V, E> Graph<V, E> {
    /// `true` iff the graph contains a directed cycle (self-loops included).
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// One directed cycle as a closed path `[u, …, u]`, or `None` if acyclic.
    ///
    /// Roots are tried in ascending handle order, so the result is
    /// deterministic for a given graph.
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<VertexId>> {
        let mut search = CycleSearch::new();
        for vertex in self.vertex_ids() {
            if let Some(cycle) = search.search_from(self, vertex) {
                return Some(cycle);
            }
        }

        debug_assert_eq!(search.done.len(), self.n_vertices(), "unclassified vertices");
        debug_assert!(search.on_stack.is_empty());
        None
    }
}
