use super::{NeighborSearch, SpatialError, collect_points};
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Point3;
use rustc_hash::FxHashMap;
use std::fmt;

/// Relative slack added to the tree query so that boundary points survive
/// rounding inside the tree; the exact test below decides membership.
const QUERY_SLACK: f64 = 1.0e-9;

/// A k-d tree over a coordinate snapshot. Valid for any query radius.
///
/// Built in one pass from a slice, so layered or lattice coordinates that
/// share a value on one axis are fine. Coincident points are stored once in
/// the tree and expanded on lookup.
pub struct KdTreeIndex {
    /// `None` for an empty snapshot.
    tree: Option<ImmutableKdTree<f64, 3>>,
    /// Distinct positions, addressed by the tree's item ids.
    sites: Vec<Point3<f64>>,
    /// Atom indices sharing each distinct position.
    members: Vec<Vec<usize>>,
    len: usize,
}

impl KdTreeIndex {
    pub fn build(
        coordinates: &[Point3<f64>],
        subset: Option<&[usize]>,
    ) -> Result<Self, SpatialError> {
        let (indices, positions) = collect_points(coordinates, subset)?;

        let mut site_of: FxHashMap<[u64; 3], usize> = FxHashMap::default();
        let mut sites = Vec::new();
        let mut members: Vec<Vec<usize>> = Vec::new();
        for (&index, point) in indices.iter().zip(&positions) {
            // Adding 0.0 folds -0.0 into 0.0 so both land on one site.
            let key = [
                (point.x + 0.0).to_bits(),
                (point.y + 0.0).to_bits(),
                (point.z + 0.0).to_bits(),
            ];
            let site = *site_of.entry(key).or_insert_with(|| {
                sites.push(*point);
                members.push(Vec::new());
                sites.len() - 1
            });
            members[site].push(index);
        }

        // Tree item ids are positions in this slice, i.e. site numbers.
        let entries: Vec<[f64; 3]> = sites.iter().map(|p| [p.x, p.y, p.z]).collect();
        let tree = (!entries.is_empty()).then(|| ImmutableKdTree::new_from_slice(&entries));

        Ok(Self {
            tree,
            sites,
            members,
            len: indices.len(),
        })
    }
}

impl fmt::Debug for KdTreeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KdTreeIndex")
            .field("points", &self.len)
            .field("sites", &self.sites.len())
            .finish()
    }
}

impl NeighborSearch for KdTreeIndex {
    fn max_radius(&self) -> f64 {
        f64::INFINITY
    }

    fn len(&self) -> usize {
        self.len
    }

    fn visit_within(&self, point: &Point3<f64>, radius: f64, visit: &mut dyn FnMut(usize, f64)) {
        let Some(tree) = &self.tree else {
            return;
        };
        let radius_sq = radius * radius;
        let query_sq = radius_sq * (1.0 + QUERY_SLACK) + f64::MIN_POSITIVE;
        let candidates = tree.within_unsorted::<SquaredEuclidean>(&[point.x, point.y, point.z], query_sq);
        for candidate in candidates {
            let site = candidate.item as usize;
            let dist_sq = (self.sites[site] - point).norm_squared();
            if dist_sq <= radius_sq {
                let distance = dist_sq.sqrt();
                for &index in &self.members[site] {
                    visit(index, distance);
                }
            }
        }
    }
}
