//! Spatial index over apartment coordinates.
//!
//! An R-tree of points answers radius queries with a coordinate-space box
//! (see [`radius_bounds`]). The box is a prefilter: it can admit points
//! outside the true circle, which callers remove with an exact distance
//! check, but with a margin >= 1 it never drops a point inside it.

use rstar::{RTree, RTreeObject, AABB};

use crate::geo_utils::radius_bounds;
use crate::{Bounds, GeoPoint};

/// Default growth factor applied to the query box.
///
/// The unscaled box already covers both metrics; this is slack for
/// rounding at the box edge.
pub const DEFAULT_PREFILTER_MARGIN: f64 = 1.05;

/// A point with its position in the source dataset.
#[derive(Debug, Clone, Copy)]
pub struct IndexedPoint {
    pub idx: usize,
    pub lat: f64,
    pub lng: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lng, self.lat])
    }
}

/// Read-only radius index, built once per apartment dataset.
#[derive(Debug)]
pub struct ApartmentIndex {
    tree: RTree<IndexedPoint>,
    margin: f64,
}

impl Default for ApartmentIndex {
    fn default() -> Self {
        Self::build(&[])
    }
}

impl ApartmentIndex {
    /// Bulk-load an index. Point `i` is reported as index `i`.
    pub fn build(points: &[GeoPoint]) -> Self {
        let indexed: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedPoint {
                idx: i,
                lat: p.latitude,
                lng: p.longitude,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(indexed),
            margin: DEFAULT_PREFILTER_MARGIN,
        }
    }

    /// Set the query box margin. Values below 1.0 are raised to 1.0.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin.max(1.0);
        self
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Candidate indices within roughly `radius_km` of `center`, sorted
    /// ascending. A superset of the exact answer.
    pub fn query_radius(&self, center: &GeoPoint, radius_km: f64) -> Vec<usize> {
        let mut hits: Vec<usize> = radius_bounds(center, radius_km, self.margin)
            .iter()
            .flat_map(|b| self.query_bounds(b))
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Indices of points inside a box, edges included.
    pub fn query_bounds(&self, bounds: &Bounds) -> Vec<usize> {
        let envelope = AABB::from_corners(
            [bounds.min_lng, bounds.min_lat],
            [bounds.max_lng, bounds.max_lat],
        );

        self.tree
            .locate_in_envelope(&envelope)
            .map(|p| p.idx)
            .collect()
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
