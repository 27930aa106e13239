// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use crate::{Edge, Graph, MinQueue, RouteError};

/// Outcome of a [shortest_path] query between two existing nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// `true` if the destination is reachable from the origin.
    pub success: bool,

    /// Ids of the nodes along the route, from the origin to the destination.
    /// Empty if there is no route.
    pub path: Vec<i64>,

    /// Sum of edge weights along [PathResult::path], in kilometers,
    /// or `-1.0` if there is no route.
    pub total_distance: f64,
}

impl PathResult {
    /// Result for an unreachable destination.
    pub fn no_path() -> Self {
        Self {
            success: false,
            path: Vec::new(),
            total_distance: -1.0,
        }
    }
}

fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    path
}

/// Returns the node reachable over `edge` when standing at `at`.
///
/// Edges may always be followed from their source; following
/// from the destination is only permitted for bidirectional edges.
#[inline]
fn traversable_neighbor(edge: &Edge, at: i64) -> Option<i64> {
    if edge.source == at {
        Some(edge.dest)
    } else if edge.dest == at && edge.bidirectional {
        Some(edge.source)
    } else {
        None
    }
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the shortest route between two nodes in the provided graph,
/// honoring one-way edges.
///
/// Returns [RouteError::EmptyGraph] for a graph without nodes, and
/// [RouteError::InvalidReference] if either endpoint does not exist.
/// An unreachable destination yields [PathResult::no_path].
///
/// Edges touching every node are gathered once per call, so the search
/// itself never scans the whole edge list.
pub fn shortest_path(g: &Graph, from_id: i64, to_id: i64) -> Result<PathResult, RouteError> {
    if g.is_empty() {
        return Err(RouteError::EmptyGraph);
    }
    g.find_node(from_id)
        .ok_or(RouteError::InvalidReference(from_id))?;
    g.find_node(to_id)
        .ok_or(RouteError::InvalidReference(to_id))?;

    let incidence = g.incidence();
    let mut queue: MinQueue<i64> = MinQueue::with_capacity(g.node_count());
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();
    let mut visited: HashSet<i64> = HashSet::default();

    known_costs.insert(from_id, 0.0);
    queue.insert(from_id, 0.0);

    while let Some((at, _)) = queue.extract_min() {
        // The queue may hold multiple entries for the same node, only the first one counts.
        if !visited.insert(at) {
            continue;
        }

        if at == to_id {
            break;
        }

        let cost = known_costs.get(&at).cloned().unwrap_or(f64::INFINITY);

        for &edge in incidence.get(&at).map(Vec::as_slice).unwrap_or_default() {
            let Some(neighbor_id) = traversable_neighbor(edge, at) else {
                continue;
            };

            // Edges may refer to nodes which were never loaded
            if visited.contains(&neighbor_id) || g.find_node(neighbor_id).is_none() {
                continue;
            }

            let neighbor_cost = cost + edge.weight;
            if neighbor_cost
                < known_costs
                    .get(&neighbor_id)
                    .cloned()
                    .unwrap_or(f64::INFINITY)
            {
                came_from.insert(neighbor_id, at);
                known_costs.insert(neighbor_id, neighbor_cost);
                queue.insert(neighbor_id, neighbor_cost);
            }
        }
    }

    match known_costs.get(&to_id) {
        Some(&total_distance) => Ok(PathResult {
            success: true,
            path: reconstruct_path(&came_from, to_id),
            total_distance,
        }),
        None => Ok(PathResult::no_path()),
    }
}
