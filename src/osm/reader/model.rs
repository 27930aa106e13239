// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Direction, Node};

/// Maximum number of node references kept for a single way.
/// Further references are silently dropped.
pub const MAX_WAY_NODES: usize = 128;

/// Represents an [OSM way](https://wiki.openstreetmap.org/wiki/Way),
/// reduced to what's needed to build edges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Way {
    pub nodes: Vec<i64>,
    pub direction: Direction,
}

/// Union over map elements relevant for building a [Graph](crate::Graph).
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Node(Node),
    Way(Way),
}
