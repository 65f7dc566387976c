// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::quadtree::{lon_dpp_table, QuadTree, Tile, MAX_DEPTH, ROOT_BOUNDS, TILE_SIZE};
use crate::BoundingBox;

/// Error conditions which may occur during [Rasterer::get_map_raster].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RasterError {
    /// The query box is ill-formed, the viewport is empty,
    /// or a required parameter is missing.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// A request for map tiles covering a box, as seen in a viewport of `w`x`h` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterRequest {
    pub ullon: f64,
    pub ullat: f64,
    pub lrlon: f64,
    pub lrlat: f64,
    pub w: f64,
    pub h: f64,
}

impl RasterRequest {
    /// Parameter names recognized by [RasterRequest::from_params].
    pub const PARAMS: [&'static str; 6] = ["ullon", "ullat", "lrlon", "lrlat", "w", "h"];

    /// Creates a request from a map of query parameters.
    /// Unrecognized parameters are ignored.
    pub fn from_params(params: &HashMap<String, f64>) -> Result<Self, RasterError> {
        let get = |key: &str| {
            params
                .get(key)
                .copied()
                .ok_or_else(|| RasterError::InvalidQuery(format!("missing parameter {key:?}")))
        };

        Ok(Self {
            ullon: get("ullon")?,
            ullat: get("ullat")?,
            lrlon: get("lrlon")?,
            lrlat: get("lrlat")?,
            w: get("w")?,
            h: get("h")?,
        })
    }

    /// Returns the queried area.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.ullon, self.ullat, self.lrlon, self.lrlat)
    }

    /// Returns the longitude degrees per pixel of the query.
    pub fn lon_dpp(&self) -> f64 {
        (self.lrlon - self.ullon) / self.w
    }

    fn validate(&self) -> Result<(), RasterError> {
        if !self.bounds().is_well_formed() {
            return Err(RasterError::InvalidQuery(format!(
                "ill-formed box: ({}, {}), ({}, {})",
                self.ullon, self.ullat, self.lrlon, self.lrlat
            )));
        }
        if !(self.w.is_finite() && self.w > 0.0 && self.h.is_finite() && self.h > 0.0) {
            return Err(RasterError::InvalidQuery(format!(
                "invalid viewport size: {}x{}",
                self.w, self.h
            )));
        }
        Ok(())
    }
}

/// Tiles to display for a [RasterRequest]. Serializes to the JSON object
/// expected by the map front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterResult {
    /// Tile image names, row by row from the top, each row from the left.
    pub render_grid: Vec<Vec<String>>,
    pub raster_ul_lon: f64,
    pub raster_ul_lat: f64,
    pub raster_lr_lon: f64,
    pub raster_lr_lat: f64,

    /// Depth of the returned tiles, equal to the number of digits in their names.
    pub depth: u8,

    /// False if the query doesn't overlap with the area covered by tiles.
    pub query_success: bool,
}

impl RasterResult {
    /// Returns the area covered by the [RasterResult::render_grid].
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.raster_ul_lon,
            self.raster_ul_lat,
            self.raster_lr_lon,
            self.raster_lr_lat,
        )
    }
}

/// Describes the set of pre-rendered tiles available to a [Rasterer].
#[derive(Debug, Clone, PartialEq)]
pub struct RasterConfig {
    /// Prefix of all image names, usually a directory with a trailing slash.
    pub img_root: String,

    /// Area covered by the root tile.
    pub root: BoundingBox,

    /// Depth of the finest tiles.
    pub max_depth: u8,

    /// Width of every tile image, in pixels.
    pub tile_size: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            img_root: "img/".to_string(),
            root: ROOT_BOUNDS,
            max_depth: MAX_DEPTH,
            tile_size: TILE_SIZE,
        }
    }
}

/// Selects the grid of pre-rendered tiles best matching a query box and viewport.
///
/// The rasterer is immutable after construction and may be shared
/// between threads serving concurrent requests.
#[derive(Debug, Clone)]
pub struct Rasterer {
    tree: QuadTree,
    lon_dpp: Vec<f64>,
}

impl Rasterer {
    pub fn new(config: &RasterConfig) -> Self {
        let tree = QuadTree::build(&config.img_root, config.root, config.max_depth);
        let lon_dpp = lon_dpp_table(&config.root, config.tile_size, config.max_depth);
        log::debug!(
            "built tile quadtree with {} tiles, depths 0..={}",
            tree.len(),
            config.max_depth
        );
        Self { tree, lon_dpp }
    }

    /// Longitude degrees per pixel of tiles at every depth.
    pub fn lon_dpp(&self) -> &[f64] {
        &self.lon_dpp
    }

    /// Returns the shallowest depth whose tiles have at most `lon_dpp`
    /// longitude degrees per pixel, or the deepest available depth if none do.
    pub fn choose_depth(&self, lon_dpp: f64) -> u8 {
        self.lon_dpp
            .iter()
            .position(|&tile_lon_dpp| tile_lon_dpp <= lon_dpp)
            .map(|depth| depth as u8)
            .unwrap_or(self.tree.max_depth())
    }

    /// Finds the grid of tiles which intersect the queried box,
    /// with resolution at least as fine as the query's.
    ///
    /// If the query does not overlap the covered area, the result has an empty grid,
    /// echoes the query as its bounds and `query_success` is false.
    pub fn get_map_raster(&self, request: &RasterRequest) -> Result<RasterResult, RasterError> {
        request.validate()?;

        let query = request.bounds();
        let depth = self.choose_depth(request.lon_dpp());
        let tiles = self.tree.intersecting(depth, &query);

        let (first, last) = match (tiles.first(), tiles.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                log::debug!("query {:?} lies outside of the tiled area", query);
                return Ok(RasterResult {
                    render_grid: Vec::new(),
                    raster_ul_lon: query.ul_lon,
                    raster_ul_lat: query.ul_lat,
                    raster_lr_lon: query.lr_lon,
                    raster_lr_lat: query.lr_lat,
                    depth,
                    query_success: false,
                });
            }
        };

        Ok(RasterResult {
            raster_ul_lon: first.bounds.ul_lon,
            raster_ul_lat: first.bounds.ul_lat,
            raster_lr_lon: last.bounds.lr_lon,
            raster_lr_lat: last.bounds.lr_lat,
            render_grid: group_into_rows(&tiles),
            depth,
            query_success: true,
        })
    }
}

/// Groups tiles with the same upper latitude into rows, ordered from the top.
/// Tiles within a row keep their relative order.
fn group_into_rows(tiles: &[&Tile]) -> Vec<Vec<String>> {
    let mut rows: Vec<(f64, Vec<String>)> = Vec::new();

    for tile in tiles {
        let lat = tile.bounds.ul_lat;
        match rows.iter_mut().find(|(row_lat, _)| *row_lat == lat) {
            Some((_, row)) => row.push(tile.name.clone()),
            None => rows.push((lat, vec![tile.name.clone()])),
        }
    }

    rows.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    rows.into_iter().map(|(_, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(bounds: BoundingBox, w: f64, h: f64) -> RasterRequest {
        RasterRequest {
            ullon: bounds.ul_lon,
            ullat: bounds.ul_lat,
            lrlon: bounds.lr_lon,
            lrlat: bounds.lr_lat,
            w,
            h,
        }
    }

    fn assert_rectangular(grid: &[Vec<String>]) {
        if let Some(first) = grid.first() {
            assert!(grid.iter().all(|row| row.len() == first.len()), "{grid:?}");
        }
    }

    #[test]
    fn whole_area_at_depth_0() {
        let r = Rasterer::new(&RasterConfig::default());
        let result = r.get_map_raster(&request(ROOT_BOUNDS, 256.0, 256.0)).unwrap();

        assert_eq!(result.depth, 0);
        assert_eq!(result.render_grid, vec![vec!["img/root.png".to_string()]]);
        assert_eq!(result.bounds(), ROOT_BOUNDS);
        assert!(result.query_success);
    }

    #[test]
    fn whole_area_at_depth_1() {
        let r = Rasterer::new(&RasterConfig::default());
        let result = r.get_map_raster(&request(ROOT_BOUNDS, 512.0, 512.0)).unwrap();

        assert_eq!(result.depth, 1);
        assert_eq!(
            result.render_grid,
            vec![
                vec!["img/1.png".to_string(), "img/2.png".to_string()],
                vec!["img/3.png".to_string(), "img/4.png".to_string()],
            ]
        );
        assert_eq!(result.bounds(), ROOT_BOUNDS);
    }

    #[test]
    fn outside_of_root() {
        let r = Rasterer::new(&RasterConfig::default());
        let result = r
            .get_map_raster(&request(BoundingBox::new(0.0, 0.0, 1.0, -1.0), 256.0, 256.0))
            .unwrap();

        assert!(result.render_grid.is_empty());
        assert!(!result.query_success);
    }

    #[test]
    fn partial_query() {
        let r = Rasterer::new(&RasterConfig::default());
        let query = BoundingBox::new(-122.241632, 37.87655, -122.24054, 37.87548);
        let req = request(query, 892.0, 875.0);
        let result = r.get_map_raster(&req).unwrap();

        assert_eq!(result.depth, 7);
        assert!(result.query_success);
        assert_rectangular(&result.render_grid);
        assert!(result.bounds().contains(&query));
        assert!(result
            .render_grid
            .iter()
            .flatten()
            .all(|name| name.len() == "img/.png".len() + 7));
    }

    #[test]
    fn depth_is_minimal() {
        let r = Rasterer::new(&RasterConfig::default());
        let query = BoundingBox::new(-122.27, 37.87, -122.23, 37.84);

        for w in [50.0, 100.0, 256.0, 300.0, 700.0, 1000.0, 1500.0, 2000.0, 5000.0, 20000.0] {
            let req = request(query, w, 600.0);
            let lon_dpp = req.lon_dpp();
            let result = r.get_map_raster(&req).unwrap();
            let depth = result.depth as usize;

            if depth < MAX_DEPTH as usize {
                assert!(r.lon_dpp()[depth] <= lon_dpp, "w={w}");
            }
            if depth > 0 {
                assert!(r.lon_dpp()[depth - 1] > lon_dpp, "w={w}");
            }

            assert_rectangular(&result.render_grid);
            assert!(result.bounds().contains(&query), "w={w}");
        }
    }

    #[test]
    fn covers_clipped_query() {
        let r = Rasterer::new(&RasterConfig::default());
        let query = BoundingBox::new(-122.32, 37.90, -122.25, 37.85);
        let result = r.get_map_raster(&request(query, 1024.0, 768.0)).unwrap();

        let clipped = query.intersection(&ROOT_BOUNDS).unwrap();
        assert!(result.query_success);
        assert!(result.bounds().contains(&clipped));
        assert_eq!(result.raster_ul_lon, ROOT_BOUNDS.ul_lon);
        assert_eq!(result.raster_ul_lat, ROOT_BOUNDS.ul_lat);
        assert_rectangular(&result.render_grid);
    }

    #[test]
    fn invalid_queries() {
        let r = Rasterer::new(&RasterConfig::default());
        let flipped = BoundingBox::new(-122.23, 37.87, -122.27, 37.84);
        let upside_down = BoundingBox::new(-122.27, 37.84, -122.23, 37.87);
        let valid = BoundingBox::new(-122.27, 37.87, -122.23, 37.84);

        for req in [
            request(flipped, 256.0, 256.0),
            request(upside_down, 256.0, 256.0),
            request(valid, 0.0, 256.0),
            request(valid, 256.0, -1.0),
        ] {
            assert!(matches!(
                r.get_map_raster(&req),
                Err(RasterError::InvalidQuery(_))
            ));
        }
    }

    #[test]
    fn from_params() {
        let mut params: HashMap<String, f64> = RasterRequest::PARAMS
            .iter()
            .zip([-122.27, 37.87, -122.23, 37.84, 800.0, 600.0])
            .map(|(&k, v)| (k.to_string(), v))
            .collect();
        params.insert("extra".to_string(), 1.0);

        let req = RasterRequest::from_params(&params).unwrap();
        assert_eq!(req.bounds(), BoundingBox::new(-122.27, 37.87, -122.23, 37.84));
        assert_eq!((req.w, req.h), (800.0, 600.0));

        params.remove("h");
        assert_eq!(
            RasterRequest::from_params(&params),
            Err(RasterError::InvalidQuery("missing parameter \"h\"".to_string()))
        );
    }

    #[test]
    fn serializes_front_end_keys() {
        let r = Rasterer::new(&RasterConfig::default());
        let result = r.get_map_raster(&request(ROOT_BOUNDS, 512.0, 512.0)).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["render_grid"][1][0], "img/3.png");
        assert_eq!(json["raster_ul_lon"], ROOT_BOUNDS.ul_lon);
        assert_eq!(json["raster_lr_lat"], ROOT_BOUNDS.lr_lat);
        assert_eq!(json["depth"], 1);
        assert_eq!(json["query_success"], true);
    }
}
