// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::osm::Error;
use crate::{earth_distance, Direction, Graph, GraphError, Node};

use super::{model, FeatureReader, Options};

/// Helper object used for storing state related to converting [map features](super::model::Feature)
/// into a [Graph].
///
/// Nodes are added immediately, while ways are kept until the whole input is read,
/// so that ways may refer to nodes declared after them.
pub(super) struct GraphBuilder<'a> {
    g: &'a mut Graph,
    options: &'a Options,
    ways: Vec<model::Way>,
}

impl<'a> GraphBuilder<'a> {
    /// Create a new graph builder, adding to the provided graph.
    pub(super) fn new(g: &'a mut Graph, options: &'a Options) -> Self {
        Self {
            g,
            options,
            ways: Vec::default(),
        }
    }

    /// Add all features from the provided [FeatureReader].
    pub(super) fn add_features<F: FeatureReader<Error = Error>>(
        &mut self,
        mut features: F,
    ) -> Result<(), Error> {
        while let Some(f) = features.next()? {
            self.add_feature(f)?;
        }
        self.create_edges()
    }

    fn add_feature(&mut self, f: model::Feature) -> Result<(), Error> {
        match f {
            model::Feature::Node(n) => self.add_node(n),
            model::Feature::Way(w) => {
                self.ways.push(w);
                Ok(())
            }
        }
    }

    fn add_node(&mut self, n: Node) -> Result<(), Error> {
        match self.g.add_node(n.id, n.lat, n.lon) {
            Ok(()) => Ok(()),
            Err(GraphError::DuplicateNode(id)) if !self.options.strict => {
                log::debug!("duplicate node {id} - skipping");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create_edges(&mut self) -> Result<(), Error> {
        for w in std::mem::take(&mut self.ways) {
            if w.nodes.len() < 2 {
                log::debug!("way with less than 2 nodes - skipping");
                continue;
            }

            for pair in w.nodes.windows(2) {
                self.create_edge(pair[0], pair[1], w.direction)?;
            }
        }
        Ok(())
    }

    fn create_edge(&mut self, a: i64, b: i64, direction: Direction) -> Result<(), GraphError> {
        let weight = match (self.g.find_node(a), self.g.find_node(b)) {
            (Some(left), Some(right)) => earth_distance(left.lat, left.lon, right.lat, right.lon),
            _ => {
                log::debug!("segment {a} - {b} refers to an unknown node - using zero weight");
                0.0
            }
        };

        match direction {
            Direction::Bidirectional => {
                self.g.add_edge(a, b, weight, true)?;
                self.g.add_edge(b, a, weight, true)
            }
            Direction::Forward => self.g.add_edge(a, b, weight, false),
            Direction::Reverse => self.g.add_edge(b, a, weight, false),
        }
    }
}
