use super::{NeighborSearch, SpatialError, collect_points};
use nalgebra::Point3;
use rustc_hash::FxHashMap;

/// Upper bound on cells along the longest axis of the bounding box.
pub const MAX_CELLS_PER_AXIS: f64 = 256.0;
/// Smallest cell edge, used when both the radius and the span are tiny.
pub const MIN_CELL_EDGE: f64 = 1.0e-3;

type CellKey = (i64, i64, i64);

/// A uniform cell list.
///
/// The cell edge is never smaller than the build radius, so the 3×3×3 block of
/// cells around a query point covers every neighbour within that radius.
#[derive(Debug, Clone)]
pub struct GridIndex {
    radius: f64,
    edge: f64,
    inv_edge: f64,
    indices: Vec<usize>,
    positions: Vec<Point3<f64>>,
    cells: FxHashMap<CellKey, Vec<usize>>,
}

impl GridIndex {
    /// Builds a grid over `coordinates` (or the `subset` of atom indices) that
    /// answers queries with radius up to `radius`.
    pub fn build(
        coordinates: &[Point3<f64>],
        subset: Option<&[usize]>,
        radius: f64,
    ) -> Result<Self, SpatialError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SpatialError::InvalidRadius(radius));
        }
        let (indices, positions) = collect_points(coordinates, subset)?;

        let edge = radius
            .max(bounding_span(&positions) / MAX_CELLS_PER_AXIS)
            .max(MIN_CELL_EDGE);
        let inv_edge = 1.0 / edge;

        let mut cells: FxHashMap<CellKey, Vec<usize>> = FxHashMap::default();
        for (slot, point) in positions.iter().enumerate() {
            cells.entry(cell_of(point, inv_edge)).or_default().push(slot);
        }

        Ok(Self {
            radius,
            edge,
            inv_edge,
            indices,
            positions,
            cells,
        })
    }

    pub fn cell_edge(&self) -> f64 {
        self.edge
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

fn cell_of(point: &Point3<f64>, inv_edge: f64) -> CellKey {
    (
        (point.x * inv_edge).floor() as i64,
        (point.y * inv_edge).floor() as i64,
        (point.z * inv_edge).floor() as i64,
    )
}

/// Longest side of the axis-aligned bounding box.
fn bounding_span(positions: &[Point3<f64>]) -> f64 {
    let Some(first) = positions.first() else {
        return 0.0;
    };
    let (min, max) = positions
        .iter()
        .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));
    (max - min).max()
}

impl NeighborSearch for GridIndex {
    fn max_radius(&self) -> f64 {
        self.radius
    }

    fn len(&self) -> usize {
        self.indices.len()
    }

    fn visit_within(&self, point: &Point3<f64>, radius: f64, visit: &mut dyn FnMut(usize, f64)) {
        let radius_sq = radius * radius;
        let (cx, cy, cz) = cell_of(point, self.inv_edge);
        for dx in -1..=1i64 {
            let Some(x) = cx.checked_add(dx) else { continue };
            for dy in -1..=1i64 {
                let Some(y) = cy.checked_add(dy) else { continue };
                for dz in -1..=1i64 {
                    let Some(z) = cz.checked_add(dz) else { continue };
                    let Some(slots) = self.cells.get(&(x, y, z)) else {
                        continue;
                    };
                    for &slot in slots {
                        let dist_sq = (self.positions[slot] - point).norm_squared();
                        if dist_sq <= radius_sq {
                            visit(self.indices[slot], dist_sq.sqrt());
                        }
                    }
                }
            }
        }
    }
}
