// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Server-side core of a slippy map over [OpenStreetMap](https://www.openstreetmap.org/) data.
//!
//! Two kinds of requests are supported:
//! - [rastering](Rasterer): picking the grid of pre-rendered tiles that best
//!   covers a query box for a given viewport width,
//! - [routing](shortest_path): finding the shortest path between two positions
//!   over the road network, using A*.
//!
//! The road network is loaded from an OSM XML file into an undirected [Graph].
//! All distances are planar: degrees of longitude and latitude are treated
//! as the same unit.
//!
//! # Example
//!
//! ```no_run
//! let mut g = bearmaps::Graph::new();
//! bearmaps::osm::add_features_from_file(
//!     &mut g,
//!     &bearmaps::osm::Options::default(),
//!     "path/to/berkeley.osm",
//! ).expect("failed to load berkeley.osm");
//!
//! let route = bearmaps::shortest_path(&g, -122.2590, 37.8700, -122.2450, 37.8620)
//!     .expect("failed to find route");
//! println!("Route: {:?}", route);
//!
//! let rasterer = bearmaps::Rasterer::new(&bearmaps::RasterConfig::default());
//! let raster = rasterer.get_map_raster(&bearmaps::RasterRequest {
//!     ullon: -122.2700,
//!     ullat: 37.8700,
//!     lrlon: -122.2300,
//!     lrlat: 37.8400,
//!     w: 800.0,
//!     h: 600.0,
//! }).expect("invalid query");
//! println!("Tiles: {:?}", raster.render_grid);
//! ```

mod astar;
mod geometry;
mod graph;
mod kd;
pub mod osm;
pub mod quadtree;
mod raster;

pub use astar::{find_route, route_length, shortest_path, RouteError, DEFAULT_STEP_LIMIT};
pub use geometry::{euclidean_distance, BoundingBox};
pub use graph::{clean_string, Graph, GraphError};
pub use kd::KDTree;
pub use raster::{RasterConfig, RasterError, RasterRequest, RasterResult, Rasterer};

/// Represents an intersection or a point along a road in the [Graph].
/// Positions are immutable once a node is added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
}
