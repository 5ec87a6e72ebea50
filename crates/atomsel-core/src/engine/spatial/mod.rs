//! # Spatial Index
//!
//! Proximity search over a fixed coordinate snapshot. Two backends implement
//! [`NeighborSearch`]:
//!
//! - [`grid::GridIndex`] - a uniform cell list sized for one radius class
//! - [`kdtree::KdTreeIndex`] - a `kiddo` k-d tree valid for any radius
//!
//! Both treat cell or tree placement as a candidate filter only; every reported
//! neighbour passed an exact `d² ≤ r²` test.

pub mod grid;
pub mod kdtree;

use crate::engine::config::SpatialBackend;
use nalgebra::Point3;
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("Coordinate of atom {index} is not finite")]
    NonFiniteCoordinate { index: usize },

    #[error("Radius {0} must be finite and non-negative")]
    InvalidRadius(f64),

    #[error("Query radius {requested} exceeds the radius {built} the index was built for")]
    RadiusExceedsIndex { requested: f64, built: f64 },
}

/// A neighbour reported by [`NeighborSearch::query_within_set`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the query point in the slice passed to the query.
    pub query: usize,
    /// Atom index of the indexed point.
    pub index: usize,
    pub distance: f64,
}

pub trait NeighborSearch: Sync {
    /// Largest radius this index answers correctly.
    fn max_radius(&self) -> f64;

    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `visit(index, distance)` once for every indexed point within
    /// `radius` of `point`. The radius must already be validated.
    fn visit_within(&self, point: &Point3<f64>, radius: f64, visit: &mut dyn FnMut(usize, f64));

    fn check_radius(&self, radius: f64) -> Result<(), SpatialError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SpatialError::InvalidRadius(radius));
        }
        if radius > self.max_radius() {
            return Err(SpatialError::RadiusExceedsIndex {
                requested: radius,
                built: self.max_radius(),
            });
        }
        Ok(())
    }

    /// Atom indices of all indexed points within `radius` of `point`, ascending.
    fn query_within_point(
        &self,
        point: &Point3<f64>,
        radius: f64,
    ) -> Result<Vec<usize>, SpatialError> {
        self.check_radius(radius)?;
        let mut hits = Vec::new();
        self.visit_within(point, radius, &mut |index, _| hits.push(index));
        hits.sort_unstable();
        Ok(hits)
    }

    /// All (query point, indexed point) pairs within `radius`, sorted by
    /// query position then atom index.
    fn query_within_set(
        &self,
        points: &[Point3<f64>],
        radius: f64,
    ) -> Result<Vec<Neighbor>, SpatialError> {
        self.check_radius(radius)?;

        let neighbors_of = |(query, point): (usize, &Point3<f64>)| {
            let mut hits = Vec::new();
            self.visit_within(point, radius, &mut |index, distance| {
                hits.push(Neighbor {
                    query,
                    index,
                    distance,
                })
            });
            hits.sort_unstable_by_key(|n| n.index);
            hits
        };

        #[cfg(not(feature = "parallel"))]
        let per_query: Vec<Vec<Neighbor>> = points.iter().enumerate().map(neighbors_of).collect();

        #[cfg(feature = "parallel")]
        let per_query: Vec<Vec<Neighbor>> =
            points.par_iter().enumerate().map(neighbors_of).collect();

        Ok(per_query.into_iter().flatten().collect())
    }
}

/// An index built with either backend, as owned by the evaluator.
#[derive(Debug)]
pub enum SpatialIndex {
    Grid(grid::GridIndex),
    KdTree(kdtree::KdTreeIndex),
}

impl SpatialIndex {
    /// Builds an index over `coordinates` (restricted to `subset` when given)
    /// for queries up to `radius`.
    pub fn build(
        backend: SpatialBackend,
        coordinates: &[Point3<f64>],
        subset: Option<&[usize]>,
        radius: f64,
    ) -> Result<Self, SpatialError> {
        Ok(match backend {
            SpatialBackend::Grid => {
                SpatialIndex::Grid(grid::GridIndex::build(coordinates, subset, radius)?)
            }
            SpatialBackend::KdTree => {
                SpatialIndex::KdTree(kdtree::KdTreeIndex::build(coordinates, subset)?)
            }
        })
    }
}

impl NeighborSearch for SpatialIndex {
    fn max_radius(&self) -> f64 {
        match self {
            SpatialIndex::Grid(index) => index.max_radius(),
            SpatialIndex::KdTree(index) => index.max_radius(),
        }
    }

    fn len(&self) -> usize {
        match self {
            SpatialIndex::Grid(index) => index.len(),
            SpatialIndex::KdTree(index) => index.len(),
        }
    }

    fn visit_within(&self, point: &Point3<f64>, radius: f64, visit: &mut dyn FnMut(usize, f64)) {
        match self {
            SpatialIndex::Grid(index) => index.visit_within(point, radius, visit),
            SpatialIndex::KdTree(index) => index.visit_within(point, radius, visit),
        }
    }
}

/// Collects `(atom index, position)` for the indexed points, rejecting non-finite coordinates.
pub(crate) fn collect_points(
    coordinates: &[Point3<f64>],
    subset: Option<&[usize]>,
) -> Result<(Vec<usize>, Vec<Point3<f64>>), SpatialError> {
    let indices: Vec<usize> = match subset {
        Some(subset) => subset.to_vec(),
        None => (0..coordinates.len()).collect(),
    };
    let mut positions = Vec::with_capacity(indices.len());
    for &index in &indices {
        let point = coordinates
            .get(index)
            .copied()
            .filter(|p| p.iter().all(|c| c.is_finite()))
            .ok_or(SpatialError::NonFiniteCoordinate { index })?;
        positions.push(point);
    }
    Ok((indices, positions))
}
