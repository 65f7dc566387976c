// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::BoundingBox;

/// Area covered by the pre-rendered tiles.
pub const ROOT_BOUNDS: BoundingBox = BoundingBox::new(
    -122.2998046875,
    37.892195547244356,
    -122.2119140625,
    37.82280243352756,
);

/// Depth of the finest pre-rendered tiles.
pub const MAX_DEPTH: u8 = 7;

/// Width (and height) of every tile image, in pixels.
pub const TILE_SIZE: u32 = 256;

/// Longitude degrees per pixel of tiles at depths 0 through [MAX_DEPTH],
/// for the [ROOT_BOUNDS] and [TILE_SIZE].
pub const DEFAULT_LON_DPP: [f64; MAX_DEPTH as usize + 1] = [
    0.00034332275390625,
    0.000171661376953125,
    0.0000858306884765625,
    0.00004291534423828125,
    0.000021457672119140625,
    0.000010728836059570312,
    0.000005364418029785156,
    0.000002682209014892578,
];

/// Computes the longitude degrees per pixel of tiles at every depth from 0
/// to `max_depth` (inclusive). Each depth halves the value of the previous one.
pub fn lon_dpp_table(root: &BoundingBox, tile_size: u32, max_depth: u8) -> Vec<f64> {
    (0..=max_depth)
        .map(|depth| root.lon_span() / (tile_size as f64 * (1u64 << depth) as f64))
        .collect()
}

/// A single pre-rendered image in the [QuadTree].
///
/// Image names encode the path from the root: every digit picks a quadrant,
/// `1` for upper-left, `2` for upper-right, `3` for lower-left and `4` for lower-right.
/// The root tile is called `root`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub name: String,
    pub depth: u8,
    pub bounds: BoundingBox,
    children: Option<Box<[Tile; 4]>>,
}

impl Tile {
    /// Returns the four sub-tiles (upper-left, upper-right, lower-left, lower-right),
    /// or an empty slice for the finest tiles.
    pub fn children(&self) -> &[Tile] {
        match self.children {
            Some(ref c) => c.as_slice(),
            None => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    fn build(img_root: &str, stem: &mut String, bounds: BoundingBox, max_depth: u8) -> Self {
        let depth = stem.len() as u8;
        let name = if stem.is_empty() {
            format!("{img_root}root.png")
        } else {
            format!("{img_root}{stem}.png")
        };

        let children = if depth < max_depth {
            let [ul, ur, ll, lr] = bounds.quadrants();
            let mut child = |digit: char, bounds: BoundingBox| {
                stem.push(digit);
                let t = Tile::build(img_root, &mut *stem, bounds, max_depth);
                stem.pop();
                t
            };
            Some(Box::new([
                child('1', ul),
                child('2', ur),
                child('3', ll),
                child('4', lr),
            ]))
        } else {
            None
        };

        Self {
            name,
            depth,
            bounds,
            children,
        }
    }

    fn collect<'a>(&'a self, depth: u8, query: &BoundingBox, into: &mut Vec<&'a Tile>) {
        if self.depth == depth || self.is_leaf() {
            into.push(self);
            return;
        }

        for child in self.children() {
            if child.bounds.intersects(query) {
                child.collect(depth, query, into);
            }
        }
    }
}

/// Regular quadtree of pre-rendered map tiles. Every level splits each tile
/// of the previous level into four equal quadrants.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadTree {
    root: Tile,
    max_depth: u8,
}

impl QuadTree {
    /// Builds the full tree of tiles down to `max_depth`.
    ///
    /// Image names are prefixed with `img_root`, e.g. with `img_root = "img/"`
    /// the root is `img/root.png` and its upper-right child is `img/2.png`.
    pub fn build(img_root: &str, bounds: BoundingBox, max_depth: u8) -> Self {
        let mut stem = String::with_capacity(max_depth as usize);
        Self {
            root: Tile::build(img_root, &mut stem, bounds, max_depth),
            max_depth,
        }
    }

    pub fn root(&self) -> &Tile {
        &self.root
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Returns the number of tiles in the tree.
    pub fn len(&self) -> usize {
        (0..=self.max_depth as u32).map(|d| 4usize.pow(d)).sum()
    }

    /// Returns all tiles at `depth` (clamped to [QuadTree::max_depth]) which
    /// [intersect](BoundingBox::intersects) `query`.
    ///
    /// Tiles are returned in depth-first order, visiting quadrants from the
    /// upper-left to the lower-right. At any single depth this is equivalent
    /// to walking the tiles row by row, top to bottom and left to right.
    pub fn intersecting(&self, depth: u8, query: &BoundingBox) -> Vec<&Tile> {
        let mut tiles = Vec::new();
        if self.root.bounds.intersects(query) {
            self.root
                .collect(depth.min(self.max_depth), query, &mut tiles);
        }
        tiles
    }
}
