// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Interactive modifications of a [Graph].
//!
//! Operations which add or remove nodes or edges take the session's [EditState]
//! and refresh its id counters afterwards. A failed operation never leaves
//! a partially-modified graph behind.

use crate::{earth_distance, Direction, Graph, GraphError};

/// Error conditions which may occur when editing a [Graph].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The referenced node doesn't exist.
    #[error("unknown node: {0}")]
    NotFound(i64),

    /// Attempted to connect a node with itself.
    #[error("can't connect node {0} with itself")]
    SelfConnection(i64),

    /// The nodes are already connected in the requested direction.
    #[error("nodes {0} and {1} are already connected")]
    AlreadyConnected(i64, i64),

    /// There is no edge between the nodes.
    #[error("nodes {0} and {1} are not connected")]
    NotConnected(i64, i64),

    #[error(transparent)]
    Storage(#[from] GraphError),
}

/// Id counters of an editing session.
///
/// Both counters are derived from the [Graph] (see [EditState::sync]) and are
/// never persisted on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditState {
    /// Id for the next node created by [create_node_at].
    pub next_node_id: i64,

    /// Id for the next way. Edges carry no way ids, and [write_graph](crate::osm::write_graph)
    /// writes every edge as a way numbered from 1, so this is one past the edge count.
    pub next_way_id: i64,
}

impl Default for EditState {
    fn default() -> Self {
        Self {
            next_node_id: 1,
            next_way_id: 1,
        }
    }
}

impl EditState {
    /// Creates the counters for a freshly loaded [Graph].
    pub fn from_graph(g: &Graph) -> Self {
        let mut state = Self::default();
        state.sync(g);
        state
    }

    /// Recomputes the counters from the current contents of a [Graph].
    pub fn sync(&mut self, g: &Graph) {
        self.next_node_id = g.max_node_id().unwrap_or(0).max(0) + 1;
        self.next_way_id = g.edge_count() as i64 + 1;
    }
}

/// Creates a new node at the given position, using [EditState::next_node_id]
/// as its id. Returns the id of the created node.
pub fn create_node_at(
    g: &mut Graph,
    state: &mut EditState,
    lat: f64,
    lon: f64,
) -> Result<i64, EditError> {
    let id = state.next_node_id;
    g.add_node(id, lat, lon)?;
    state.next_node_id += 1;

    log::debug!("created node {id} at ({lat:.6}, {lon:.6})");
    Ok(id)
}

/// Checks whether a node has at most 2 incident edges, and thus is only a "through" node
/// whose removal is unlikely to break the network.
///
/// This check is advisory - [delete_node] does not consult it.
pub fn can_delete(g: &Graph, id: i64) -> bool {
    g.incident_edges(id).count() <= 2
}

/// Deletes a node together with all edges starting or ending at it.
pub fn delete_node(g: &mut Graph, state: &mut EditState, id: i64) -> Result<(), EditError> {
    g.remove_node_cascade(id).ok_or(EditError::NotFound(id))?;
    state.sync(g);

    log::debug!("deleted node {id}");
    Ok(())
}

/// Checks whether `to_id` can be reached directly from `from_id`, that is whether
/// there's an edge `from_id → to_id` or a bidirectional edge `to_id → from_id`.
pub fn nodes_are_connected(g: &Graph, from_id: i64, to_id: i64) -> bool {
    g.edges().iter().any(|e| {
        (e.source == from_id && e.dest == to_id)
            || (e.source == to_id && e.dest == from_id && e.bidirectional)
    })
}

/// Creates a new bidirectional edge between two existing, not-yet-connected nodes.
/// The edge weight is the distance between the nodes.
pub fn connect(
    g: &mut Graph,
    state: &mut EditState,
    from_id: i64,
    to_id: i64,
) -> Result<(), EditError> {
    if from_id == to_id {
        return Err(EditError::SelfConnection(from_id));
    }

    let from = g.find_node(from_id).ok_or(EditError::NotFound(from_id))?;
    let to = g.find_node(to_id).ok_or(EditError::NotFound(to_id))?;

    if nodes_are_connected(g, from_id, to_id) {
        return Err(EditError::AlreadyConnected(from_id, to_id));
    }

    let weight = earth_distance(from.lat, from.lon, to.lat, to.lon);
    g.add_edge(from_id, to_id, weight, true)?;
    state.sync(g);

    log::debug!("connected nodes {from_id} and {to_id} ({weight:.3} km)");
    Ok(())
}

/// Removes the first edge `from_id → to_id`, or bidirectional edge `to_id → from_id`.
pub fn disconnect(
    g: &mut Graph,
    state: &mut EditState,
    from_id: i64,
    to_id: i64,
) -> Result<(), EditError> {
    g.remove_edge_matching(|e| {
        (e.source == from_id && e.dest == to_id)
            || (e.source == to_id && e.dest == from_id && e.bidirectional)
    })
    .ok_or(EditError::NotConnected(from_id, to_id))?;
    state.sync(g);

    log::debug!("disconnected nodes {from_id} and {to_id}");
    Ok(())
}

/// Checks whether the edge `from_id → to_id` is bidirectional.
/// Returns `None` if there's no such edge.
pub fn is_edge_bidirectional(g: &Graph, from_id: i64, to_id: i64) -> Option<bool> {
    g.find_edge(from_id, to_id).map(|e| e.bidirectional)
}

/// Changes the directionality of the edge `from_id → to_id`.
///
/// When making the edge bidirectional, a stored reverse edge `to_id → from_id`
/// (the other half of a two-way street) is made bidirectional as well.
pub fn set_edge_bidirectional(
    g: &mut Graph,
    from_id: i64,
    to_id: i64,
    bidirectional: bool,
) -> Result<(), EditError> {
    let edge = g
        .find_edge_mut(from_id, to_id)
        .ok_or(EditError::NotConnected(from_id, to_id))?;
    edge.bidirectional = bidirectional;

    if bidirectional {
        if let Some(reverse) = g.find_edge_mut(to_id, from_id) {
            reverse.bidirectional = true;
        }
    }

    log::debug!(
        "edge {from_id} → {to_id} set to {}",
        if bidirectional { "bidirectional" } else { "oneway" }
    );
    Ok(())
}

/// Makes the connection between two nodes follow the provided [Direction],
/// relative to `node1 → node2`.
///
/// - [Direction::Bidirectional] marks every stored edge between the nodes bidirectional.
/// - [Direction::Forward] leaves only one-way `node1 → node2` edges. Stored `node2 → node1`
///   edges are removed, except when no `node1 → node2` edge exists - then the first of them
///   is turned around (its weight is symmetric and stays unchanged).
/// - [Direction::Reverse] is the mirror image of [Direction::Forward].
///
/// Fails with [EditError::NotConnected] if no edge between the nodes is stored.
pub fn set_connection_direction(
    g: &mut Graph,
    state: &mut EditState,
    node1: i64,
    node2: i64,
    direction: Direction,
) -> Result<(), EditError> {
    let has_forward = g.find_edge(node1, node2).is_some();
    let has_reverse = g.find_edge(node2, node1).is_some();
    if !has_forward && !has_reverse {
        return Err(EditError::NotConnected(node1, node2));
    }

    match direction {
        Direction::Bidirectional => {
            for e in g.edges_mut() {
                if (e.source == node1 && e.dest == node2) || (e.source == node2 && e.dest == node1)
                {
                    e.bidirectional = true;
                }
            }
        }
        Direction::Forward => make_one_way(g, node1, node2),
        Direction::Reverse => make_one_way(g, node2, node1),
    }
    state.sync(g);

    log::debug!("connection {node1} - {node2} set to {direction:?}");
    Ok(())
}

/// Leaves only one-way `from → to` edges between two nodes.
/// At least one edge between the nodes must exist.
fn make_one_way(g: &mut Graph, from: i64, to: i64) {
    if g.find_edge(from, to).is_none() {
        if let Some(e) = g.find_edge_mut(to, from) {
            e.source = from;
            e.dest = to;
        }
    }

    while g
        .remove_edge_matching(|e| e.source == to && e.dest == from)
        .is_some()
    {}

    for e in g.edges_mut() {
        if e.source == from && e.dest == to {
            e.bidirectional = false;
        }
    }
}

/// Counts one-way stored edges.
pub fn count_oneway_edges(g: &Graph) -> usize {
    g.count_oneway_edges()
}

/// Counts bidirectional stored edges.
pub fn count_bidirectional_edges(g: &Graph) -> usize {
    g.count_bidirectional_edges()
}
