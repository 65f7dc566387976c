// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use crate::{Graph, GraphError, RouteError, DEFAULT_STEP_LIMIT};

#[derive(Debug, Clone, Copy)]
struct FlatQueueItem {
    at: i64,
    cost: f64,
    score: f64,
}

impl PartialEq for FlatQueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.score.eq(&other.score)
    }
}

impl PartialOrd for FlatQueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for FlatQueueItem {}

impl Ord for FlatQueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.score.total_cmp(&self.score)
    }
}

fn reconstruct_flat_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    path
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the shortest route between two nodes in the provided graph.
///
/// Edge costs and the heuristic are both the planar distance between nodes,
/// so the heuristic is consistent and the first time `to_id` leaves the queue
/// its route is optimal. Queue entries are never updated in place; outdated
/// entries are skipped when popped.
///
/// The returned route starts with `from_id` and ends with `to_id`.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [RouteError::StepLimitExceeded]. Concluding that no route exists requires
/// expanding all nodes accessible from the start. The recommended value is
/// [DEFAULT_STEP_LIMIT].
pub fn find_route(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
) -> Result<Vec<i64>, RouteError> {
    let mut queue: BinaryHeap<FlatQueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();
    let mut steps: usize = 0;

    queue.push(FlatQueueItem {
        at: from_id,
        cost: 0.0,
        score: g.distance(from_id, to_id)?,
    });
    known_costs.insert(from_id, 0.0);

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            return Ok(reconstruct_flat_path(&came_from, to_id));
        }

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same node.
        if item.cost > known_costs.get(&item.at).cloned().unwrap_or(f64::INFINITY) {
            continue;
        }

        steps += 1;
        if steps > step_limit {
            return Err(RouteError::StepLimitExceeded);
        }

        for &neighbor_id in g.adjacent(item.at)? {
            if neighbor_id == item.at {
                continue;
            }

            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + g.distance(item.at, neighbor_id)?;
            if neighbor_cost
                >= known_costs
                    .get(&neighbor_id)
                    .cloned()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            queue.push(FlatQueueItem {
                at: neighbor_id,
                cost: neighbor_cost,
                score: neighbor_cost + g.distance(neighbor_id, to_id)?,
            });
        }
    }

    Err(RouteError::NoRoute)
}

/// Finds the shortest route between the nodes closest to the start
/// and destination positions.
///
/// The returned route starts with the node closest to `(st_lon, st_lat)`
/// and ends with the node closest to `(dest_lon, dest_lat)`.
pub fn shortest_path(
    g: &Graph,
    st_lon: f64,
    st_lat: f64,
    dest_lon: f64,
    dest_lat: f64,
) -> Result<Vec<i64>, RouteError> {
    let source = g.closest(st_lon, st_lat).ok_or(RouteError::EmptyGraph)?;
    let dest = g.closest(dest_lon, dest_lat).ok_or(RouteError::EmptyGraph)?;
    log::debug!("routing from node {} to node {}", source.id, dest.id);
    find_route(g, source.id, dest.id, DEFAULT_STEP_LIMIT)
}

/// Sums the planar distances between consecutive nodes of a route.
pub fn route_length(g: &Graph, route: &[i64]) -> Result<f64, GraphError> {
    route
        .windows(2)
        .map(|pair| g.distance(pair[0], pair[1]))
        .sum()
}
