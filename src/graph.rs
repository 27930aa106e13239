// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::hash_map::{Entry, HashMap};
use std::collections::TryReserveError;

use crate::{Edge, Node};

/// Error conditions which may occur when adding elements to a [Graph].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Growing the node or edge storage failed.
    #[error("allocation failure: {0}")]
    AllocationFailure(#[from] TryReserveError),

    /// A [Node] with the same id is already present in the graph.
    #[error("duplicate node: {0}")]
    DuplicateNode(i64),
}

/// Represents a map as a flat set of [Nodes](Node) and [Edges](Edge) between them.
///
/// Both collections are plain vectors and removals swap the last element into
/// the freed slot, so the order of [Graph::nodes] and [Graph::edges] is not
/// stable across deletions.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,

    /// Position of every node in `nodes`, by node id.
    index: HashMap<i64, usize>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of stored (directed) edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns all [Nodes](Node), in storage order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns all [Edges](Edge), in storage order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Appends a new [Node].
    ///
    /// Fails with [GraphError::DuplicateNode] if a node with the same id already exists.
    pub fn add_node(&mut self, id: i64, lat: f64, lon: f64) -> Result<(), GraphError> {
        self.nodes.try_reserve(1)?;
        self.index.try_reserve(1)?;

        match self.index.entry(id) {
            Entry::Occupied(_) => Err(GraphError::DuplicateNode(id)),
            Entry::Vacant(e) => {
                e.insert(self.nodes.len());
                self.nodes.push(Node { id, lat, lon });
                Ok(())
            }
        }
    }

    /// Appends a new [Edge].
    ///
    /// The endpoints are not validated - callers which need that guarantee
    /// must check them with [Graph::find_node] first. The weight must be
    /// a non-negative distance, which is only checked in debug builds.
    pub fn add_edge(
        &mut self,
        source: i64,
        dest: i64,
        weight: f64,
        bidirectional: bool,
    ) -> Result<(), GraphError> {
        debug_assert!(weight >= 0.0, "invalid edge weight: {weight}");
        self.edges.try_reserve(1)?;
        self.edges.push(Edge {
            source,
            dest,
            weight,
            bidirectional,
        });
        Ok(())
    }

    /// Retrieves a [Node] with the provided id.
    pub fn find_node(&self, id: i64) -> Option<Node> {
        self.index.get(&id).map(|&idx| self.nodes[idx])
    }

    /// Returns the highest node id in the graph, or `None` if the graph is empty.
    pub fn max_node_id(&self) -> Option<i64> {
        self.nodes.iter().map(|n| n.id).max()
    }

    /// Removes a [Node] and every [Edge] starting or ending at it.
    /// Returns the removed node, or `None` if no such node exists
    /// (in which case the graph is left untouched).
    pub fn remove_node_cascade(&mut self, id: i64) -> Option<Node> {
        let idx = self.index.remove(&id)?;

        self.remove_edges_where(|e| e.source == id || e.dest == id);

        let removed = self.nodes.swap_remove(idx);
        if let Some(moved) = self.nodes.get(idx) {
            self.index.insert(moved.id, idx);
        }

        debug_assert_eq!(removed.id, id);
        Some(removed)
    }

    /// Removes the first [Edge] (in storage order) matching the predicate.
    pub fn remove_edge_matching<F: FnMut(&Edge) -> bool>(&mut self, predicate: F) -> Option<Edge> {
        let idx = self.edges.iter().position(predicate)?;
        Some(self.edges.swap_remove(idx))
    }

    fn remove_edges_where<F: FnMut(&Edge) -> bool>(&mut self, mut predicate: F) {
        let mut i = 0;
        while i < self.edges.len() {
            if predicate(&self.edges[i]) {
                // The swapped-in edge needs to be checked as well, so don't advance
                self.edges.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Gets the first stored [Edge] going from `source` to `dest`.
    pub fn find_edge(&self, source: i64, dest: i64) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.dest == dest)
    }

    /// Gets a mutable reference to the first stored [Edge] going from `source` to `dest`.
    pub fn find_edge_mut(&mut self, source: i64, dest: i64) -> Option<&mut Edge> {
        self.edges
            .iter_mut()
            .find(|e| e.source == source && e.dest == dest)
    }

    /// Returns an iterator over all [Edges](Edge) which start or end at the given node.
    pub fn incident_edges(&self, id: i64) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(move |e| e.source == id || e.dest == id)
    }

    /// Groups edges by the nodes they touch, preserving storage order within each group.
    /// Self-loops are listed once.
    pub(crate) fn incidence(&self) -> HashMap<i64, Vec<&Edge>> {
        let mut incidence: HashMap<i64, Vec<&Edge>> = HashMap::default();
        for edge in &self.edges {
            incidence.entry(edge.source).or_default().push(edge);
            if edge.dest != edge.source {
                incidence.entry(edge.dest).or_default().push(edge);
            }
        }
        incidence
    }

    /// Counts one-way (not bidirectional) stored edges.
    pub fn count_oneway_edges(&self) -> usize {
        self.edges.iter().filter(|e| !e.bidirectional).count()
    }

    /// Counts bidirectional stored edges.
    pub fn count_bidirectional_edges(&self) -> usize {
        self.edges.iter().filter(|e| e.bidirectional).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut g = Graph::new();
        g.add_node(1, 0.0, 0.0).unwrap();
        g.add_node(2, 0.0, 1.0).unwrap();
        g.add_node(3, 0.0, 2.0).unwrap();
        g.add_node(4, 1.0, 1.0).unwrap();
        g.add_edge(1, 2, 1.0, true).unwrap();
        g.add_edge(2, 3, 1.0, false).unwrap();
        g.add_edge(4, 2, 1.5, true).unwrap();
        g.add_edge(3, 4, 2.0, false).unwrap();
        g
    }

    #[test]
    fn find_node() {
        let g = sample();
        assert_eq!(
            g.find_node(3),
            Some(Node {
                id: 3,
                lat: 0.0,
                lon: 2.0
            })
        );
        assert_eq!(g.find_node(5), None);
        assert_eq!(g.max_node_id(), Some(4));
    }

    #[test]
    fn duplicate_node() {
        let mut g = sample();
        assert_eq!(g.add_node(2, 5.0, 5.0), Err(GraphError::DuplicateNode(2)));
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.find_node(2).unwrap().lon, 1.0);
    }

    #[test]
    fn remove_node_cascade() {
        let mut g = sample();
        let removed = g.remove_node_cascade(2).unwrap();
        assert_eq!(removed.id, 2);

        assert_eq!(g.node_count(), 3);
        assert_eq!(g.find_node(2), None);
        assert!(g.edges().iter().all(|e| e.source != 2 && e.dest != 2));
        assert_eq!(g.edge_count(), 1);

        // Remaining nodes are still reachable through the index after the swap
        for id in [1, 3, 4] {
            assert_eq!(g.find_node(id).map(|n| n.id), Some(id));
        }
    }

    #[test]
    fn remove_unknown_node() {
        let mut g = sample();
        assert_eq!(g.remove_node_cascade(42), None);
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn remove_last_node() {
        let mut g = sample();
        g.remove_node_cascade(4).unwrap();
        assert_eq!(g.find_node(4), None);
        assert_eq!(g.find_node(3).map(|n| n.id), Some(3));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn remove_edge_matching() {
        let mut g = sample();
        let removed = g.remove_edge_matching(|e| e.dest == 3).unwrap();
        assert_eq!((removed.source, removed.dest), (2, 3));
        assert_eq!(g.edge_count(), 3);
        assert!(g.find_edge(2, 3).is_none());
        assert!(g.remove_edge_matching(|e| e.dest == 3).is_none());
    }

    #[test]
    fn incident_edges() {
        let g = sample();
        let mut incident: Vec<(i64, i64)> =
            g.incident_edges(2).map(|e| (e.source, e.dest)).collect();
        incident.sort();
        assert_eq!(incident, vec![(1, 2), (2, 3), (4, 2)]);
    }

    #[test]
    fn edge_counts() {
        let g = sample();
        assert_eq!(g.count_oneway_edges(), 2);
        assert_eq!(g.count_bidirectional_edges(), 2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid edge weight")]
    fn negative_edge_weight() {
        let mut g = sample();
        let _ = g.add_edge(1, 3, -1.0, true);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid edge weight")]
    fn nan_edge_weight() {
        let mut g = sample();
        let _ = g.add_edge(1, 3, f64::NAN, true);
    }

    #[test]
    fn incidence_lists_self_loops_once() {
        let mut g = Graph::new();
        g.add_node(1, 0.0, 0.0).unwrap();
        g.add_edge(1, 1, 0.0, true).unwrap();
        assert_eq!(g.incidence().get(&1).map(|v| v.len()), Some(1));
    }
}
