//! Directed acyclic graph built on [`Graph`].
//!
//! # Overview
//!
//! [`Dag`] wraps a [`Graph`] and only hands out `&Graph` for reading, so
//! every edge insertion goes through [`Dag::insert_edge`], which keeps the
//! edge set acyclic:
//!
//! ```text
//! Proposed ──insert──▶ search from src ──no cycle──▶ Committed
//!                                │
//!                                └──cycle──▶ remove edge ──▶ RolledBack
//! ```
//!
//! Only the new edge can close a cycle, and any such cycle passes through
//! its source, so a single DFS rooted at `src` is enough. The rollback
//! happens before `insert_edge` returns; callers never see a cyclic state.
//!
//! Self-loops are a contract violation and panic.
//!
//! # Usage
//!
//! ```
//! use grafiins_core::dag::Dag;
//!
//! let mut dag: Dag<&str, ()> = Dag::new();
//! let a = dag.add_vertex("a");
//! let b = dag.add_vertex("b");
//! assert!(dag.add_edge(a, b, ()).is_some());
//! assert!(dag.add_edge(b, a, ()).is_none()); // would close a -> b -> a
//! assert_eq!(dag.as_graph().n_edges(), 1);
//! ```

use tracing::{debug, trace};

use crate::config::GraphConfig;
use crate::error::EdgeRejection;
use crate::graph::{CycleSearch, EdgeId, Graph, VertexId};

/// A graph whose edge relation is always acyclic.
#[derive(Debug, Clone)]
pub struct Dag<V, E> {
    graph: Graph<V, E>,
}

impl<V, E> Default for Dag<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Dag<V, E> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    #[must_use]
    pub const fn with_parallel_edges(allow_parallel_edges: bool) -> Self {
        Self {
            graph: Graph::with_parallel_edges(allow_parallel_edges),
        }
    }

    #[must_use]
    pub const fn from_config(config: &GraphConfig) -> Self {
        Self::with_parallel_edges(config.allow_parallel_edges)
    }

    /// Adopt `graph` if it is acyclic; hand it back unchanged otherwise.
    ///
    /// # Errors
    ///
    /// Returns the graph when it contains a cycle or a self-loop.
    pub fn try_from_graph(graph: Graph<V, E>) -> Result<Self, Graph<V, E>> {
        if graph.is_cyclic() {
            return Err(graph);
        }
        Ok(Self { graph })
    }

    /// Read-only view of the underlying graph.
    #[must_use]
    pub const fn as_graph(&self) -> &Graph<V, E> {
        &self.graph
    }

    #[must_use]
    pub fn into_graph(self) -> Graph<V, E> {
        self.graph
    }

    pub fn add_vertex(&mut self, data: V) -> VertexId {
        self.graph.add_vertex(data)
    }

    /// # Panics
    ///
    /// Panics if `vertex` is not live.
    #[track_caller]
    pub fn remove_vertex(&mut self, vertex: VertexId) -> V {
        self.graph.remove_vertex(vertex)
    }

    /// # Panics
    ///
    /// Panics if `edge` is not live.
    #[track_caller]
    pub fn remove_edge(&mut self, edge: EdgeId) -> E {
        self.graph.remove_edge(edge)
    }

    /// # Panics
    ///
    /// Panics if `vertex` is not live.
    #[track_caller]
    pub fn vertex_mut(&mut self, vertex: VertexId) -> &mut V {
        self.graph.vertex_mut(vertex)
    }

    /// # Panics
    ///
    /// Panics if `edge` is not live.
    #[track_caller]
    pub fn edge_mut(&mut self, edge: EdgeId) -> &mut E {
        self.graph.edge_mut(edge)
    }

    /// Add `src -> dst`, or `None` if it is a parallel edge or would close a cycle.
    ///
    /// # Panics
    ///
    /// Panics on a self-loop or if either endpoint is not live.
    #[track_caller]
    pub fn add_edge(&mut self, src: VertexId, dst: VertexId, data: E) -> Option<EdgeId> {
        self.insert_edge(src, dst, data).ok()
    }

    /// Add `src -> dst`, rolling it back if it would close a cycle.
    ///
    /// # Errors
    ///
    /// - [`EdgeRejection::ParallelEdge`] when the graph forbids parallel edges
    ///   and `src -> dst` exists.
    /// - [`EdgeRejection::WouldCreateCycle`] with the cycle the edge closed.
    ///
    /// The DAG is unchanged in both cases.
    ///
    /// # Panics
    ///
    /// Panics if `src == dst` or either endpoint is not live.
    #[track_caller]
    pub fn insert_edge(
        &mut self,
        src: VertexId,
        dst: VertexId,
        data: E,
    ) -> Result<EdgeId, EdgeRejection> {
        assert_ne!(src, dst, "self-loop on {src} is not allowed in a DAG");

        let edge = self.graph.insert_edge(src, dst, data)?;

        let mut search = CycleSearch::new();
        let Some(cycle) = search.search_from(&self.graph, src) else {
            trace!(%edge, %src, %dst, "committed dag edge");
            return Ok(edge);
        };

        self.graph.remove_edge(edge);
        debug!(%src, %dst, cycle_len = cycle.len() - 1, "rolled back edge that would close a cycle");
        Err(EdgeRejection::WouldCreateCycle { src, dst, cycle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> (Dag<usize, ()>, Vec<VertexId>) {
        let mut dag = Dag::new();
        let v: Vec<VertexId> = (0..n).map(|i| dag.add_vertex(i)).collect();
        for pair in v.windows(2) {
            dag.add_edge(pair[0], pair[1], ()).expect("chain edge");
        }
        (dag, v)
    }

    #[test]
    fn forward_edges_commit() {
        let (mut dag, v) = chain(4);
        let shortcut = dag.add_edge(v[0], v[3], ()).expect("shortcut keeps the dag acyclic");
        assert!(dag.as_graph().contains_edge(shortcut));
        assert_eq!(dag.as_graph().n_edges(), 4);
        assert!(!dag.as_graph().is_cyclic());
    }

    #[test]
    fn closing_edge_is_rolled_back() {
        let (mut dag, v) = chain(4);
        let edges_before = dag.as_graph().edge_ids();

        let rejection = dag.insert_edge(v[3], v[0], ()).expect_err("closes a cycle");
        assert_eq!(
            rejection,
            EdgeRejection::WouldCreateCycle {
                src: v[3],
                dst: v[0],
                cycle: vec![v[3], v[0], v[1], v[2], v[3]],
            }
        );
        assert_eq!(dag.as_graph().edge_ids(), edges_before);
        assert!(dag.as_graph().out_edges(v[3]).is_empty());
        assert!(dag.as_graph().in_edges(v[0]).is_empty());
        assert!(!dag.as_graph().is_cyclic());
        dag.as_graph().debug_validate_invariants();
    }

    #[test]
    fn rolled_back_slot_is_reused_by_next_edge() {
        let (mut dag, v) = chain(3);
        assert!(dag.add_edge(v[2], v[0], ()).is_none());
        let next = dag.add_edge(v[0], v[2], ()).expect("forward edge");
        assert_eq!(next.index(), 2);
    }

    #[test]
    fn parallel_edge_rejection_propagates() {
        let (mut dag, v) = chain(2);
        assert_eq!(
            dag.insert_edge(v[0], v[1], ()),
            Err(EdgeRejection::ParallelEdge { src: v[0], dst: v[1] })
        );
    }

    #[test]
    fn parallel_edges_allowed_when_enabled() {
        let mut dag: Dag<(), ()> = Dag::with_parallel_edges(true);
        let a = dag.add_vertex(());
        let b = dag.add_vertex(());
        assert!(dag.add_edge(a, b, ()).is_some());
        assert!(dag.add_edge(a, b, ()).is_some());
        assert_eq!(dag.as_graph().n_edges(), 2);
    }

    #[test]
    #[should_panic(expected = "self-loop")]
    fn self_loop_panics() {
        let (mut dag, v) = chain(1);
        dag.add_edge(v[0], v[0], ());
    }

    #[test]
    fn removal_reopens_previously_rejected_edge() {
        let (mut dag, v) = chain(3);
        assert!(dag.add_edge(v[2], v[0], ()).is_none());

        let middle = dag.as_graph().find_edge(v[1], v[2]).expect("chain edge");
        dag.remove_edge(middle);
        assert!(dag.add_edge(v[2], v[0], ()).is_some());
        assert!(!dag.as_graph().is_cyclic());
    }

    #[test]
    fn try_from_graph_rejects_cyclic_input() {
        let mut graph: Graph<(), ()> = Graph::new();
        let a = graph.add_vertex(());
        let b = graph.add_vertex(());
        graph.add_edge(a, b, ()).expect("edge");
        let graph = Dag::try_from_graph(graph).expect("acyclic").into_graph();

        let mut graph = graph;
        graph.add_edge(b, a, ()).expect("edge");
        let returned = Dag::try_from_graph(graph).expect_err("cyclic");
        assert_eq!(returned.n_edges(), 2);
    }

    #[test]
    fn payload_mutation_goes_through_dag() {
        let (mut dag, v) = chain(2);
        *dag.vertex_mut(v[1]) = 42;
        assert_eq!(*dag.as_graph().vertex(v[1]), 42);
        assert_eq!(dag.remove_vertex(v[1]), 42);
        assert_eq!(dag.as_graph().n_edges(), 0);
    }
}
