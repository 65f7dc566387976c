// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Calculates the planar distance between two lon-lat positions, treating
/// degrees of longitude and latitude as the same unit.
///
/// This is not a great-circle distance. It is used both as the edge weight
/// and as the A* heuristic, which keeps the heuristic consistent.
#[inline]
pub fn euclidean_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    (lon1 - lon2).hypot(lat1 - lat2)
}

/// Axis-aligned rectangle in lon-lat space, described by its upper-left and
/// lower-right corners. Latitude decreases downwards, so a well-formed box has
/// `ul_lon < lr_lon` and `ul_lat > lr_lat`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub ul_lon: f64,
    pub ul_lat: f64,
    pub lr_lon: f64,
    pub lr_lat: f64,
}

impl BoundingBox {
    pub const fn new(ul_lon: f64, ul_lat: f64, lr_lon: f64, lr_lat: f64) -> Self {
        Self {
            ul_lon,
            ul_lat,
            lr_lon,
            lr_lat,
        }
    }

    /// Returns true if the corners are finite and ordered
    /// (`ul_lon < lr_lon` and `ul_lat > lr_lat`).
    pub fn is_well_formed(&self) -> bool {
        self.ul_lon.is_finite()
            && self.ul_lat.is_finite()
            && self.lr_lon.is_finite()
            && self.lr_lat.is_finite()
            && self.ul_lon < self.lr_lon
            && self.ul_lat > self.lr_lat
    }

    /// Width of the box in degrees of longitude.
    #[inline]
    pub fn lon_span(&self) -> f64 {
        self.lr_lon - self.ul_lon
    }

    /// Checks if two boxes share some area. Boxes which only touch along an edge
    /// or at a corner do not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.lr_lon <= other.ul_lon
            || self.ul_lon >= other.lr_lon
            || self.lr_lat >= other.ul_lat
            || self.ul_lat <= other.lr_lat)
    }

    /// Checks if `other` lies entirely within this box (edges inclusive).
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.ul_lon <= other.ul_lon
            && self.ul_lat >= other.ul_lat
            && self.lr_lon >= other.lr_lon
            && self.lr_lat <= other.lr_lat
    }

    /// Returns the overlapping part of two boxes, if they [intersect](BoundingBox::intersects).
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if self.intersects(other) {
            Some(BoundingBox {
                ul_lon: self.ul_lon.max(other.ul_lon),
                ul_lat: self.ul_lat.min(other.ul_lat),
                lr_lon: self.lr_lon.min(other.lr_lon),
                lr_lat: self.lr_lat.max(other.lr_lat),
            })
        } else {
            None
        }
    }

    /// Splits the box into four quadrants by bisecting both axes,
    /// in the order: upper-left, upper-right, lower-left, lower-right.
    pub fn quadrants(&self) -> [BoundingBox; 4] {
        let mid_lon = (self.ul_lon + self.lr_lon) / 2.0;
        let mid_lat = (self.ul_lat + self.lr_lat) / 2.0;
        [
            BoundingBox::new(self.ul_lon, self.ul_lat, mid_lon, mid_lat),
            BoundingBox::new(mid_lon, self.ul_lat, self.lr_lon, mid_lat),
            BoundingBox::new(self.ul_lon, mid_lat, mid_lon, self.lr_lat),
            BoundingBox::new(mid_lon, mid_lat, self.lr_lon, self.lr_lat),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let d1 = euclidean_distance(0.0, 0.0, 3.0, 4.0);
        let d2 = euclidean_distance(3.0, 4.0, 0.0, 0.0);
        assert_eq!(d1, 5.0);
        assert_eq!(d1, d2);
        assert_eq!(euclidean_distance(1.5, -2.0, 1.5, -2.0), 0.0);
    }

    #[test]
    fn intersects() {
        let a = BoundingBox::new(0.0, 10.0, 10.0, 0.0);
        let b = BoundingBox::new(5.0, 15.0, 15.0, 5.0);
        let c = BoundingBox::new(20.0, 30.0, 30.0, 20.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = BoundingBox::new(0.0, 10.0, 10.0, 0.0);
        let right = BoundingBox::new(10.0, 10.0, 20.0, 0.0);
        let below = BoundingBox::new(0.0, 0.0, 10.0, -10.0);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
    }

    #[test]
    fn quadrants() {
        let b = BoundingBox::new(0.0, 4.0, 4.0, 0.0);
        let [ul, ur, ll, lr] = b.quadrants();
        assert_eq!(ul, BoundingBox::new(0.0, 4.0, 2.0, 2.0));
        assert_eq!(ur, BoundingBox::new(2.0, 4.0, 4.0, 2.0));
        assert_eq!(ll, BoundingBox::new(0.0, 2.0, 2.0, 0.0));
        assert_eq!(lr, BoundingBox::new(2.0, 2.0, 4.0, 0.0));
    }

    #[test]
    fn intersection_and_contains() {
        let a = BoundingBox::new(0.0, 10.0, 10.0, 0.0);
        let b = BoundingBox::new(5.0, 15.0, 15.0, 5.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i, BoundingBox::new(5.0, 10.0, 10.0, 5.0));
        assert!(a.contains(&i));
        assert!(b.contains(&i));
        assert!(!i.contains(&a));
    }

    #[test]
    fn well_formed() {
        let a = BoundingBox::new(0.0, 10.0, 10.0, 0.0);
        assert!(a.is_well_formed());
        assert_eq!(a.lon_span(), 10.0);
        assert!(!BoundingBox::new(1.0, 0.0, 0.0, 1.0).is_well_formed());
        assert!(!BoundingBox::new(0.0, 1.0, f64::NAN, 0.0).is_well_formed());
    }
}
