//! Directed graph over two entity arenas.
//!
//! # Overview
//!
//! [`Graph`] owns a vertex [`Arena`] and an edge [`Arena`]. Each vertex keeps
//! two back-reference sets, `in_edges` and `out_edges`, holding the handles
//! of its incident edges. These are relations, not ownership: every edge is
//! owned by the edge arena and names exactly one source and one destination
//! vertex.
//!
//! ## Invariants
//!
//! - Every edge's endpoints are live vertices.
//! - For every live edge `e = (s, d)`: `e ∈ out_edges(s)` and `e ∈ in_edges(d)`,
//!   and every handle in any adjacency set is a live edge with that endpoint.
//! - Without `allow_parallel_edges`, no two live edges share `(s, d)`.
//!
//! Removing a vertex first removes all its incident edges.
//!
//! ## Submodules
//!
//! - [`reach`]: multi-source reachability (`are_connected_any`).
//! - [`cycles`]: explicit-stack DFS cycle detection.
//!
//! ## Typical Usage
//!
//! ```
//! use grafiins_core::graph::Graph;
//!
//! let mut g: Graph<&str, ()> = Graph::new();
//! let a = g.add_vertex("a");
//! let b = g.add_vertex("b");
//! assert!(g.add_edge(a, b, ()).is_some());
//! assert!(g.add_edge(a, b, ()).is_none()); // parallel edge
//! assert!(!g.is_cyclic());
//! ```

pub mod cycles;
pub mod reach;

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use tracing::{debug, trace};

use crate::arena::{Arena, Handle};
use crate::config::GraphConfig;
use crate::error::EdgeRejection;
use crate::payload::{EDGE_DST_FIELD, EDGE_SRC_FIELD, Fields, Serializable};

pub use cycles::CycleSearch;

/// Handle of a vertex. Independent of edge handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(Handle);

impl VertexId {
    #[must_use]
    pub const fn handle(self) -> Handle {
        self.0
    }

    /// Slot index; unique among live vertices.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0.index()
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.index())
    }
}

/// Handle of an edge. Independent of vertex handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(Handle);

impl EdgeId {
    #[must_use]
    pub const fn handle(self) -> Handle {
        self.0
    }

    /// Slot index; unique among live edges.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0.index()
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.index())
    }
}

#[derive(Debug, Clone)]
struct VertexEntry<V> {
    in_edges: BTreeSet<EdgeId>,
    out_edges: BTreeSet<EdgeId>,
    data: V,
}

#[derive(Debug, Clone)]
struct EdgeEntry<E> {
    src: VertexId,
    dst: VertexId,
    data: E,
}

/// Directed graph with caller-supplied vertex payloads `V` and edge payloads `E`.
#[derive(Debug, Clone)]
pub struct Graph<V, E> {
    vertices: Arena<VertexEntry<V>>,
    edges: Arena<EdgeEntry<E>>,
    allow_parallel_edges: bool,
}

impl<V, E> Default for Graph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Graph<V, E> {
    /// Empty graph that rejects parallel edges.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_parallel_edges(false)
    }

    #[must_use]
    pub const fn with_parallel_edges(allow_parallel_edges: bool) -> Self {
        Self {
            vertices: Arena::new(),
            edges: Arena::new(),
            allow_parallel_edges,
        }
    }

    #[must_use]
    pub const fn from_config(config: &GraphConfig) -> Self {
        Self::with_parallel_edges(config.allow_parallel_edges)
    }

    #[must_use]
    pub const fn allow_parallel_edges(&self) -> bool {
        self.allow_parallel_edges
    }

    #[must_use]
    pub const fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub const fn n_edges(&self) -> usize {
        self.edges.len()
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Live vertex handles in ascending slot order.
    #[must_use]
    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.iter().map(|(handle, _)| VertexId(handle)).collect()
    }

    /// Live edge handles in ascending slot order.
    #[must_use]
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.iter().map(|(handle, _)| EdgeId(handle)).collect()
    }

    /// Iterate live vertices with their payloads in ascending slot order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &V)> + '_ {
        self.vertices
            .iter()
            .map(|(handle, entry)| (VertexId(handle), &entry.data))
    }

    /// Iterate live edges as `(id, src, dst, payload)` in ascending slot order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, VertexId, VertexId, &E)> + '_ {
        self.edges
            .iter()
            .map(|(handle, entry)| (EdgeId(handle), entry.src, entry.dst, &entry.data))
    }

    #[must_use]
    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.vertices.contains(vertex.0)
    }

    #[must_use]
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(edge.0)
    }

    pub fn random_vertex<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<VertexId> {
        self.vertices.random_handle(rng).map(VertexId)
    }

    pub fn random_edge<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<EdgeId> {
        self.edges.random_handle(rng).map(EdgeId)
    }

    /// # Panics
    ///
    /// Panics if `vertex` is not live.
    #[track_caller]
    #[must_use]
    pub fn vertex(&self, vertex: VertexId) -> &V {
        &self.vertices.at(vertex.0).data
    }

    /// # Panics
    ///
    /// Panics if `vertex` is not live.
    #[track_caller]
    pub fn vertex_mut(&mut self, vertex: VertexId) -> &mut V {
        &mut self.vertices.at_mut(vertex.0).data
    }

    #[must_use]
    pub fn get_vertex(&self, vertex: VertexId) -> Option<&V> {
        self.vertices.get(vertex.0).map(|entry| &entry.data)
    }

    /// # Panics
    ///
    /// Panics if `edge` is not live.
    #[track_caller]
    #[must_use]
    pub fn edge(&self, edge: EdgeId) -> &E {
        &self.edges.at(edge.0).data
    }

    /// # Panics
    ///
    /// Panics if `edge` is not live.
    #[track_caller]
    pub fn edge_mut(&mut self, edge: EdgeId) -> &mut E {
        &mut self.edges.at_mut(edge.0).data
    }

    #[must_use]
    pub fn get_edge(&self, edge: EdgeId) -> Option<&E> {
        self.edges.get(edge.0).map(|entry| &entry.data)
    }

    /// `(source, destination)` of `edge`.
    ///
    /// # Panics
    ///
    /// Panics if `edge` is not live.
    #[track_caller]
    #[must_use]
    pub fn endpoints(&self, edge: EdgeId) -> (VertexId, VertexId) {
        let entry = self.edges.at(edge.0);
        (entry.src, entry.dst)
    }

    /// Edges whose destination is `vertex`.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is not live.
    #[track_caller]
    #[must_use]
    pub fn in_edges(&self, vertex: VertexId) -> &BTreeSet<EdgeId> {
        &self.vertices.at(vertex.0).in_edges
    }

    /// Edges whose source is `vertex`.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is not live.
    #[track_caller]
    #[must_use]
    pub fn out_edges(&self, vertex: VertexId) -> &BTreeSet<EdgeId> {
        &self.vertices.at(vertex.0).out_edges
    }

    #[track_caller]
    #[must_use]
    pub fn in_degree(&self, vertex: VertexId) -> usize {
        self.in_edges(vertex).len()
    }

    #[track_caller]
    #[must_use]
    pub fn out_degree(&self, vertex: VertexId) -> usize {
        self.out_edges(vertex).len()
    }

    /// Destinations of every out-edge of `vertex`, one entry per edge.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is not live.
    #[track_caller]
    pub fn successors(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.out_edges(vertex)
            .iter()
            .map(|&edge| self.edges.at(edge.0).dst)
    }

    /// Sources of every in-edge of `vertex`, one entry per edge.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is not live.
    #[track_caller]
    pub fn predecessors(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.in_edges(vertex)
            .iter()
            .map(|&edge| self.edges.at(edge.0).src)
    }

    #[track_caller]
    #[must_use]
    pub fn out_vertices(&self, vertex: VertexId) -> Vec<VertexId> {
        self.successors(vertex).collect()
    }

    #[track_caller]
    #[must_use]
    pub fn in_vertices(&self, vertex: VertexId) -> Vec<VertexId> {
        self.predecessors(vertex).collect()
    }

    /// First edge `src -> dst` in slot order, if any.
    #[track_caller]
    #[must_use]
    pub fn find_edge(&self, src: VertexId, dst: VertexId) -> Option<EdgeId> {
        self.out_edges(src)
            .iter()
            .copied()
            .find(|&edge| self.edges.at(edge.0).dst == dst)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    pub fn add_vertex(&mut self, data: V) -> VertexId {
        let vertex = VertexId(self.vertices.insert(VertexEntry {
            in_edges: BTreeSet::new(),
            out_edges: BTreeSet::new(),
            data,
        }));
        trace!(%vertex, "added vertex");
        vertex
    }

    /// Remove `vertex` and every edge incident to it; returns its payload.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is not live.
    #[track_caller]
    pub fn remove_vertex(&mut self, vertex: VertexId) -> V {
        let entry = self.vertices.at(vertex.0);
        // A self-loop sits in both sets; the union removes it once.
        let incident: BTreeSet<EdgeId> = entry.in_edges.union(&entry.out_edges).copied().collect();
        for &edge in &incident {
            self.remove_edge(edge);
        }

        let entry = self.vertices.remove(vertex.0);
        debug_assert!(entry.in_edges.is_empty() && entry.out_edges.is_empty());
        trace!(%vertex, removed_edges = incident.len(), "removed vertex");
        entry.data
    }

    /// Add `src -> dst`, or `None` if it is a rejected parallel edge.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is not live.
    #[track_caller]
    pub fn add_edge(&mut self, src: VertexId, dst: VertexId, data: E) -> Option<EdgeId> {
        self.insert_edge(src, dst, data).ok()
    }

    /// Add `src -> dst`, reporting why the edge was refused.
    ///
    /// # Errors
    ///
    /// [`EdgeRejection::ParallelEdge`] when parallel edges are disabled and
    /// `src -> dst` already exists. The graph is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is not live.
    #[track_caller]
    pub fn insert_edge(
        &mut self,
        src: VertexId,
        dst: VertexId,
        data: E,
    ) -> Result<EdgeId, EdgeRejection> {
        assert!(self.contains_vertex(src), "edge source {src} is not a live vertex");
        assert!(self.contains_vertex(dst), "edge destination {dst} is not a live vertex");

        if !self.allow_parallel_edges && self.find_edge(src, dst).is_some() {
            debug!(%src, %dst, "rejected parallel edge");
            return Err(EdgeRejection::ParallelEdge { src, dst });
        }

        let edge = EdgeId(self.edges.insert(EdgeEntry { src, dst, data }));
        self.vertices.at_mut(src.0).out_edges.insert(edge);
        self.vertices.at_mut(dst.0).in_edges.insert(edge);
        trace!(%edge, %src, %dst, "added edge");
        Ok(edge)
    }

    /// Remove `edge` and unregister it from both endpoints; returns its payload.
    ///
    /// # Panics
    ///
    /// Panics if `edge` is not live.
    #[track_caller]
    pub fn remove_edge(&mut self, edge: EdgeId) -> E {
        let (src, dst) = self.endpoints(edge);
        let unlinked_out = self.vertices.at_mut(src.0).out_edges.remove(&edge);
        let unlinked_in = self.vertices.at_mut(dst.0).in_edges.remove(&edge);
        debug_assert!(unlinked_out && unlinked_in, "edge {edge} missing from adjacency");

        let entry = self.edges.remove(edge.0);
        trace!(%edge, %src, %dst, "removed edge");
        entry.data
    }

    /// Assert every graph and arena invariant.
    ///
    /// # Panics
    ///
    /// Panics when an invariant does not hold.
    pub fn debug_validate_invariants(&self) {
        self.vertices.debug_validate_invariants();
        self.edges.debug_validate_invariants();

        for (handle, entry) in self.edges.iter() {
            let edge = EdgeId(handle);
            assert!(self.contains_vertex(entry.src), "{edge} has dead source {}", entry.src);
            assert!(self.contains_vertex(entry.dst), "{edge} has dead destination {}", entry.dst);
            assert!(self.out_edges(entry.src).contains(&edge), "{edge} missing from out_edges");
            assert!(self.in_edges(entry.dst).contains(&edge), "{edge} missing from in_edges");
        }

        let mut pairs = BTreeSet::new();
        for (handle, entry) in self.vertices.iter() {
            let vertex = VertexId(handle);
            for &edge in &entry.out_edges {
                assert_eq!(self.endpoints(edge).0, vertex, "{edge} listed as out-edge of {vertex}");
                let fresh = pairs.insert(self.endpoints(edge));
                assert!(self.allow_parallel_edges || fresh, "parallel edge {edge}");
            }
            for &edge in &entry.in_edges {
                assert_eq!(self.endpoints(edge).1, vertex, "{edge} listed as in-edge of {vertex}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Export hook
// ---------------------------------------------------------------------------

impl<V: Serializable, E> Graph<V, E> {
    /// `(handle, fields)` for every live vertex in ascending handle order.
    #[must_use]
    pub fn vertex_rows(&self) -> Vec<(VertexId, Fields)> {
        self.vertices()
            .map(|(vertex, data)| (vertex, data.fields()))
            .collect()
    }
}

impl<V, E: Serializable> Graph<V, E> {
    /// `(handle, fields)` for every live edge in ascending handle order.
    ///
    /// The endpoint columns come first, followed by the payload fields.
    #[must_use]
    pub fn edge_rows(&self) -> Vec<(EdgeId, Fields)> {
        self.edges()
            .map(|(edge, src, dst, data)| {
                let mut fields = vec![
                    (EDGE_SRC_FIELD.to_string(), src.index().to_string()),
                    (EDGE_DST_FIELD.to_string(), dst.index().to_string()),
                ];
                fields.extend(data.fields());
                (edge, fields)
            })
            .collect()
    }

    /// Edge column names: endpoint columns, then `E`'s payload columns.
    #[must_use]
    pub fn edge_field_names() -> Vec<String> {
        let mut names = vec![EDGE_SRC_FIELD.to_string(), EDGE_DST_FIELD.to_string()];
        names.extend(E::field_names());
        names
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{EdgeData, VertexData};

    fn path_graph(n: usize) -> (Graph<usize, ()>, Vec<VertexId>) {
        let mut graph = Graph::new();
        let vertices: Vec<VertexId> = (0..n).map(|i| graph.add_vertex(i)).collect();
        for pair in vertices.windows(2) {
            graph.add_edge(pair[0], pair[1], ()).expect("path edges are distinct");
        }
        (graph, vertices)
    }

    #[test]
    fn empty_graph_has_no_entities() {
        let graph: Graph<(), ()> = Graph::default();
        assert_eq!(graph.n_vertices(), 0);
        assert_eq!(graph.n_edges(), 0);
        assert!(graph.vertex_ids().is_empty());
        assert!(graph.edge_ids().is_empty());
        assert!(!graph.allow_parallel_edges());
    }

    #[test]
    fn add_edge_registers_both_endpoints() {
        let mut graph: Graph<&str, &str> = Graph::new();
        let a = graph.add_vertex("a");
        let b = graph.add_vertex("b");
        let edge = graph.add_edge(a, b, "ab").expect("first edge");

        assert!(graph.out_edges(a).contains(&edge));
        assert!(graph.in_edges(b).contains(&edge));
        assert!(graph.in_edges(a).is_empty());
        assert!(graph.out_edges(b).is_empty());
        assert_eq!(graph.endpoints(edge), (a, b));
        assert_eq!(graph.out_vertices(a), vec![b]);
        assert_eq!(graph.in_vertices(b), vec![a]);
        assert_eq!(*graph.edge(edge), "ab");
        graph.debug_validate_invariants();
    }

    #[test]
    fn remove_edge_unregisters_both_endpoints() {
        let mut graph: Graph<(), u8> = Graph::new();
        let a = graph.add_vertex(());
        let b = graph.add_vertex(());
        let edge = graph.add_edge(a, b, 9).expect("edge");

        assert_eq!(graph.remove_edge(edge), 9);
        assert!(!graph.contains_edge(edge));
        assert!(graph.out_edges(a).is_empty());
        assert!(graph.in_edges(b).is_empty());
        assert_eq!(graph.n_edges(), 0);
        graph.debug_validate_invariants();
    }

    #[test]
    fn parallel_edges_rejected_by_default() {
        let mut graph: Graph<(), ()> = Graph::new();
        let a = graph.add_vertex(());
        let b = graph.add_vertex(());

        assert!(graph.add_edge(a, b, ()).is_some());
        assert_eq!(
            graph.insert_edge(a, b, ()),
            Err(EdgeRejection::ParallelEdge { src: a, dst: b })
        );
        assert_eq!(graph.n_edges(), 1);
        // The reverse direction is a different ordered pair.
        assert!(graph.add_edge(b, a, ()).is_some());
    }

    #[test]
    fn parallel_edges_allowed_when_enabled() {
        let mut graph: Graph<(), ()> = Graph::with_parallel_edges(true);
        let a = graph.add_vertex(());
        let b = graph.add_vertex(());

        let first = graph.add_edge(a, b, ()).expect("first");
        let second = graph.add_edge(a, b, ()).expect("second");
        assert_ne!(first, second);
        assert_eq!(graph.n_edges(), 2);
        assert_eq!(graph.out_vertices(a), vec![b, b]);
        graph.debug_validate_invariants();
    }

    #[test]
    fn remove_vertex_cascades_to_incident_edges() {
        let mut graph: Graph<u8, ()> = Graph::new();
        let hub = graph.add_vertex(0);
        let others: Vec<VertexId> = (1..=4).map(|i| graph.add_vertex(i)).collect();
        graph.add_edge(others[0], hub, ()).expect("in");
        graph.add_edge(others[1], hub, ()).expect("in");
        graph.add_edge(hub, others[2], ()).expect("out");
        let untouched = graph.add_edge(others[2], others[3], ()).expect("unrelated");

        let degree = graph.in_degree(hub) + graph.out_degree(hub);
        let before = graph.n_edges();
        assert_eq!(graph.remove_vertex(hub), 0);

        assert_eq!(graph.n_edges(), before - degree);
        assert_eq!(graph.edge_ids(), vec![untouched]);
        assert!(graph.out_edges(others[0]).is_empty());
        assert!(graph.in_edges(others[2]).is_empty());
        graph.debug_validate_invariants();
    }

    #[test]
    fn remove_vertex_handles_self_loop() {
        let mut graph: Graph<(), ()> = Graph::new();
        let a = graph.add_vertex(());
        graph.add_edge(a, a, ()).expect("self-loop is allowed in a plain graph");
        assert_eq!(graph.in_degree(a), 1);
        assert_eq!(graph.out_degree(a), 1);

        graph.remove_vertex(a);
        assert_eq!(graph.n_vertices(), 0);
        assert_eq!(graph.n_edges(), 0);
        graph.debug_validate_invariants();
    }

    #[test]
    fn vertex_handles_recycle_after_removal() {
        let (mut graph, vertices) = path_graph(3);
        graph.remove_vertex(vertices[0]);
        let recycled = graph.add_vertex(10);

        assert_eq!(recycled.index(), vertices[0].index());
        assert!(!graph.contains_vertex(vertices[0]));
        assert_eq!(*graph.vertex(recycled), 10);
        assert!(graph.in_edges(recycled).is_empty());
    }

    #[test]
    #[should_panic(expected = "stale")]
    fn stale_vertex_handle_panics() {
        let (mut graph, vertices) = path_graph(2);
        graph.remove_vertex(vertices[1]);
        let _ = graph.vertex(vertices[1]);
    }

    #[test]
    #[should_panic(expected = "edge destination v1 is not a live vertex")]
    fn add_edge_to_dead_vertex_panics() {
        let (mut graph, vertices) = path_graph(2);
        graph.remove_vertex(vertices[1]);
        graph.add_edge(vertices[0], vertices[1], ());
    }

    #[test]
    fn payload_accessors_round_trip() {
        let mut graph: Graph<VertexData, EdgeData> = Graph::new();
        let a = graph.add_vertex(VertexData::new("a"));
        let b = graph.add_vertex(VertexData::new("b"));
        let edge = graph.add_edge(a, b, EdgeData::new("ab")).expect("edge");

        graph.vertex_mut(a).graphviz_shape = "doublecircle".to_string();
        graph.edge_mut(edge).label.push('!');

        assert_eq!(graph.vertex(a).graphviz_shape, "doublecircle");
        assert_eq!(graph.get_edge(edge).map(|e| e.label.as_str()), Some("ab!"));
        assert!(graph.get_vertex(b).is_some());
    }

    #[test]
    fn export_rows_follow_handle_order() {
        let mut graph: Graph<VertexData, EdgeData> = Graph::new();
        let a = graph.add_vertex(VertexData::new("a"));
        let b = graph.add_vertex(VertexData::new("b"));
        let c = graph.add_vertex(VertexData::new("c"));
        graph.add_edge(c, a, EdgeData::new("ca")).expect("edge");
        graph.add_edge(a, b, EdgeData::new("ab")).expect("edge");

        let vertex_rows = graph.vertex_rows();
        let labels: Vec<&str> = vertex_rows.iter().map(|(_, f)| f[0].1.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);

        let edge_rows = graph.edge_rows();
        assert_eq!(edge_rows.len(), 2);
        assert_eq!(edge_rows[0].1[0], ("src_vertex_i".to_string(), "2".to_string()));
        assert_eq!(edge_rows[0].1[1], ("dst_vertex_i".to_string(), "0".to_string()));
        assert_eq!(edge_rows[0].1[2].1, "ca");
        assert_eq!(
            Graph::<VertexData, EdgeData>::edge_field_names(),
            vec!["src_vertex_i", "dst_vertex_i", "label"]
        );
    }

    #[test]
    fn from_config_honours_parallel_flag() {
        let config = GraphConfig {
            allow_parallel_edges: true,
        };
        let graph: Graph<(), ()> = Graph::from_config(&config);
        assert!(graph.allow_parallel_edges());
    }
}
