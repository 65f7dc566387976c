// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{euclidean_distance, Graph, Node};

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which can be used to speed up nearest-neighbor search for large graphs.
/// [Graph::closest] scans every node, which dominates request time once routes
/// are computed over a city-sized network. A k-d tree trades memory usage for CPU time.
///
/// The tree uses the same planar metric as [Graph::closest], so for any position
/// without ties both return the same node.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Node,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the closest [Node] to the given position.
    pub fn find_nearest_node(&self, lon: f64, lat: f64) -> Node {
        self.find_nearest_node_impl(lon, lat, false).0
    }

    fn find_nearest_node_impl(&self, lon: f64, lat: f64, lon_divides: bool) -> (Node, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = euclidean_distance(lon, lat, best.lon, best.lat);

        // Select which branch to recurse into first
        let first_left = if lon_divides {
            lon < best.lon
        } else {
            lat < best.lat
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_node_impl(lon, lat, !lon_divides);
            if alt_dist < best_dist {
                best = alt;
                best_dist = alt_dist;
            }
        }

        if let Some(ref branch) = second {
            // A closer node is possible in the second branch if and only if
            // the splitting axis is closer than the current best candidate.
            let dist_to_axis = if lon_divides {
                (lon - self.pivot.lon).abs()
            } else {
                (lat - self.pivot.lat).abs()
            };

            if dist_to_axis < best_dist {
                let (alt, alt_dist) = branch.find_nearest_node_impl(lon, lat, !lon_divides);
                if alt_dist < best_dist {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree over all nodes of a [Graph].
    /// Returns `None` if the graph is empty.
    pub fn from_graph(g: &Graph) -> Option<Self> {
        Self::from_iter(g.iter().copied())
    }

    /// Builds a k-d tree from an iterable of [Nodes](Node).
    pub fn from_iter<I: IntoIterator<Item = Node>>(nodes: I) -> Option<Self> {
        let mut nodes = nodes.into_iter().collect::<Vec<_>>();
        Self::build(nodes.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of [Nodes](Node). Nodes will be reordered
    /// in the slice to facilitate building the tree.
    pub fn build(nodes: &mut [Node]) -> Option<Self> {
        Self::build_impl(nodes, false)
    }

    fn build_impl(nodes: &mut [Node], lon_divides: bool) -> Option<Self> {
        match nodes.len() {
            0 => None,
            1 => Some(Self {
                pivot: nodes[0],
                left: None,
                right: None,
            }),
            _ => {
                if lon_divides {
                    nodes.sort_by(|a, b| a.lon.total_cmp(&b.lon));
                } else {
                    nodes.sort_by(|a, b| a.lat.total_cmp(&b.lat));
                }
                let median = nodes.len() / 2;
                let pivot = nodes[median];
                let (left, right_and_pivot) = nodes.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: Self::build_impl(left, !lon_divides).map(Box::new),
                    right: Self::build_impl(right, !lon_divides).map(Box::new),
                })
            }
        }
    }
}
