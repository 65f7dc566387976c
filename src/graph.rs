// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{euclidean_distance, Node};
use std::collections::btree_map::{BTreeMap, Entry};

/// Error conditions raised by [Graph] accessors and mutators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The referenced node does not exist in the graph.
    #[error("unknown node: {0}")]
    UnknownNode(i64),

    /// A node with the same id was already added.
    #[error("duplicate node: {0}")]
    DuplicateNode(i64),
}

/// Represents a road network as an undirected, planar graph of [Nodes](Node)
/// with adjacency lists.
///
/// Edges carry no explicit weight; the cost of an edge is the
/// [planar distance](crate::euclidean_distance) between its endpoints.
/// The graph is built once, then only read.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(pub(crate) BTreeMap<i64, (Node, Vec<i64>)>);

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.values().map(|(node, _)| node)
    }

    /// Returns an iterator over the ids of all nodes in the graph.
    pub fn vertices(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.keys().copied()
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.0.get(&id).map(|&(node, _)| node)
    }

    /// Inserts a new node with no neighbors.
    ///
    /// Node positions are immutable, thus re-adding an existing id
    /// fails with [GraphError::DuplicateNode] and leaves the graph untouched.
    pub fn add_node(&mut self, id: i64, lon: f64, lat: f64) -> Result<(), GraphError> {
        match self.0.entry(id) {
            Entry::Vacant(e) => {
                e.insert((Node { id, lon, lat }, Vec::default()));
                Ok(())
            }
            Entry::Occupied(_) => Err(GraphError::DuplicateNode(id)),
        }
    }

    /// Connects every consecutive pair of nodes of a polyline (an OSM way)
    /// with an undirected edge.
    ///
    /// All ids are checked before any edge is added, so a way referencing
    /// an unknown node leaves the graph unchanged. Consecutive repeated ids
    /// are skipped, as they would create self-loops.
    pub fn connect_way(&mut self, ids: &[i64]) -> Result<(), GraphError> {
        if let Some(&missing) = ids.iter().find(|id| !self.0.contains_key(id)) {
            return Err(GraphError::UnknownNode(missing));
        }

        for pair in ids.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                continue;
            }
            self.neighbors_mut(a).push(b);
            self.neighbors_mut(b).push(a);
        }

        Ok(())
    }

    fn neighbors_mut(&mut self, id: i64) -> &mut Vec<i64> {
        &mut self
            .0
            .get_mut(&id)
            .expect("connect_way must validate ids before adding edges")
            .1
    }

    /// Removes every node without any neighbors. Returns the number of removed nodes.
    ///
    /// Only isolated nodes are removed, so no adjacency list can start
    /// referring to a missing node.
    pub fn clean(&mut self) -> usize {
        let before = self.0.len();
        self.0.retain(|_, (_, neighbors)| !neighbors.is_empty());
        before - self.0.len()
    }

    /// Returns the ids of all neighbors of the node `v`.
    ///
    /// The slice may contain duplicates if multiple ways connect the same nodes.
    pub fn adjacent(&self, v: i64) -> Result<&[i64], GraphError> {
        self.0
            .get(&v)
            .map(|(_, neighbors)| neighbors.as_slice())
            .ok_or(GraphError::UnknownNode(v))
    }

    /// Returns the planar distance between nodes `v` and `w`.
    pub fn distance(&self, v: i64, w: i64) -> Result<f64, GraphError> {
        let a = self.node(v)?;
        let b = self.node(w)?;
        Ok(euclidean_distance(a.lon, a.lat, b.lon, b.lat))
    }

    /// Finds the [Node] closest to the given position.
    /// Returns `None` only if the graph is empty.
    ///
    /// This function requires computing the distance to every [Node] in the graph.
    /// Use a [KDTree](crate::KDTree) to answer many queries over a large graph.
    pub fn closest(&self, lon: f64, lat: f64) -> Option<Node> {
        let mut best: Option<(f64, Node)> = None;
        for nd in self.iter() {
            let dist = euclidean_distance(lon, lat, nd.lon, nd.lat);
            match best {
                Some((best_dist, _)) if best_dist <= dist => {}
                _ => best = Some((dist, *nd)),
            }
        }
        best.map(|(_, nd)| nd)
    }

    /// Longitude of the node `v`.
    pub fn lon(&self, v: i64) -> Result<f64, GraphError> {
        self.node(v).map(|n| n.lon)
    }

    /// Latitude of the node `v`.
    pub fn lat(&self, v: i64) -> Result<f64, GraphError> {
        self.node(v).map(|n| n.lat)
    }

    #[inline]
    fn node(&self, v: i64) -> Result<&Node, GraphError> {
        self.0
            .get(&v)
            .map(|(node, _)| node)
            .ok_or(GraphError::UnknownNode(v))
    }
}

/// Normalizes a place name for searching: keeps only ASCII letters and spaces,
/// and lowercases the result.
pub fn clean_string(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
