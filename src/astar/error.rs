// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::GraphError;

/// Recommended number of allowed node expansions in [find_route](crate::find_route)
/// before [RouteError::StepLimitExceeded] is returned.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Error conditions which may occur during [find_route](crate::find_route) or
/// [shortest_path](crate::shortest_path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The graph has no nodes, so no position can be snapped to a node.
    #[error("graph is empty")]
    EmptyGraph,

    /// Every node reachable from the start was expanded without reaching the end.
    #[error("no route between nodes")]
    NoRoute,

    /// Route search has exceeded its limit of steps.
    /// Either the nodes are really far apart, or no route exists.
    ///
    /// Concluding that no route exists requires traversing the whole component,
    /// which can take a long time on large graphs. The step limit protects
    /// against resource exhaustion.
    #[error("step limit exceeded")]
    StepLimitExceeded,

    /// The start or end nodes (or a node referred to by an edge)
    /// don't exist in the graph.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
