// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Editable routing graphs over [OpenStreetMap](https://www.openstreetmap.org/)-style map files.
//!
//! A map is loaded into a [Graph] of [Nodes](Node) and [Edges](Edge), where every edge
//! is either bidirectional or one-way. The graph can be edited in place (see [edit])
//! and queried for shortest paths with [shortest_path], which honors one-way edges.
//!
//! # Example
//!
//! ```no_run
//! let g = waygraph::osm::read_graph_from_file(
//!     &waygraph::osm::Options::default(),
//!     "path/to/map.osm",
//! ).expect("failed to load map.osm");
//!
//! let route = waygraph::shortest_path(&g, 1, 3).expect("unknown node");
//! if route.success {
//!     println!("Route: {:?} ({:.3} km)", route.path, route.total_distance);
//! }
//! ```

pub mod c;
mod dijkstra;
mod distance;
pub mod edit;
mod graph;
pub mod osm;
mod queue;

pub use dijkstra::{shortest_path, PathResult, RouteError};
pub use distance::earth_distance;
pub use edit::{EditError, EditState};
pub use graph::{Graph, GraphError};
pub use queue::MinQueue;

/// Represents a point of the [Graph].
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

/// Represents a stored connection between two [Nodes](Node).
///
/// `weight` is the distance between the endpoints in kilometers, computed
/// when the edge is created and never updated afterwards.
///
/// A bidirectional edge may be traversed from either endpoint,
/// a one-way edge only from `source` to `dest`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Edge {
    pub source: i64,
    pub dest: i64,
    pub weight: f64,
    pub bidirectional: bool,
}

/// Direction of travel allowed between two nodes,
/// relative to the order in which they are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Only from the first node to the second one.
    Forward,

    /// Both ways.
    #[default]
    Bidirectional,

    /// Only from the second node to the first one.
    Reverse,
}
