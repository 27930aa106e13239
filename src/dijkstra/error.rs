// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions which may occur during [shortest_path](crate::shortest_path).
///
/// An unreachable destination is not an error - it is reported
/// as a [PathResult](crate::PathResult) with `success == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The graph has no nodes at all.
    #[error("graph is empty")]
    EmptyGraph,

    /// The start or end nodes don't exist in a graph.
    #[error("invalid node: {0}")]
    InvalidReference(i64),
}
