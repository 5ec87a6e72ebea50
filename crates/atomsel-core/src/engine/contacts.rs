use super::config::{ContactsConfig, SameResiduePolicy, SpatialBackend};
use super::error::SelectionError;
use super::mask::Mask;
use super::spatial::{NeighborSearch, SpatialIndex, collect_points};
use crate::core::models::system::AtomicSystem;
use tracing::debug;

/// A subset of the atoms of one system.
#[derive(Debug, Clone)]
pub struct AtomSet<'a> {
    system: &'a AtomicSystem,
    indices: Vec<usize>,
}

impl<'a> AtomSet<'a> {
    /// The atoms selected by `mask`. Mask positions past the end of the system
    /// are ignored.
    pub fn new(system: &'a AtomicSystem, mask: &Mask) -> Self {
        Self {
            system,
            indices: mask.iter_indices().filter(|&i| i < system.len()).collect(),
        }
    }

    pub fn all(system: &'a AtomicSystem) -> Self {
        Self {
            system,
            indices: (0..system.len()).collect(),
        }
    }

    /// The atoms at `indices`, sorted and deduplicated.
    pub fn from_indices(
        system: &'a AtomicSystem,
        indices: impl IntoIterator<Item = usize>,
    ) -> Result<Self, SelectionError> {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        if let Some(&bad) = indices.iter().find(|&&i| i >= system.len()) {
            return Err(SelectionError::InvalidValue {
                value: bad.to_string(),
                message: format!("atom index out of range for a system of {} atoms", system.len()),
                position: None,
            });
        }
        indices.sort_unstable();
        indices.dedup();
        Ok(Self { system, indices })
    }

    pub fn system(&self) -> &'a AtomicSystem {
        self.system
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn to_mask(&self) -> Mask {
        Mask::from_indices(self.system.len(), self.indices.iter().copied())
    }
}

/// A pair of atoms no farther apart than the contact radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Atom index in the first set's system.
    pub index_a: usize,
    /// Atom index in the second set's system (the first set's in self mode).
    pub index_b: usize,
    pub distance: f64,
}

/// Finds all pairs within `radius`, using a grid index.
///
/// With `b` given, reports every `(a, b)` pair. Without it, reports each
/// unordered pair of `a` once with `index_a < index_b`, dropping pairs in the
/// same residue under [`SameResiduePolicy::Exclude`]. Results are sorted by
/// `(index_a, index_b)`.
pub fn find_contacts(
    a: &AtomSet<'_>,
    b: Option<&AtomSet<'_>>,
    radius: f64,
    same_residue: SameResiduePolicy,
) -> Result<Vec<Contact>, SelectionError> {
    let config = ContactsConfig {
        radius,
        same_residue,
        backend: SpatialBackend::default(),
    };
    find_contacts_with(a, b, &config)
}

/// [`find_contacts`] with an explicit backend.
pub fn find_contacts_with(
    a: &AtomSet<'_>,
    b: Option<&AtomSet<'_>>,
    config: &ContactsConfig,
) -> Result<Vec<Contact>, SelectionError> {
    let mut contacts = match b {
        Some(b) => cross_contacts(a, b, config)?,
        None => self_contacts(a, config)?,
    };
    contacts.sort_unstable_by_key(|c| (c.index_a, c.index_b));
    debug!(
        contacts = contacts.len(),
        radius = config.radius,
        "Contact search finished."
    );
    Ok(contacts)
}

fn cross_contacts(
    a: &AtomSet<'_>,
    b: &AtomSet<'_>,
    config: &ContactsConfig,
) -> Result<Vec<Contact>, SelectionError> {
    if a.is_empty() || b.is_empty() {
        return Ok(Vec::new());
    }
    // Index the larger set and stream the smaller one through it.
    let a_is_indexed = a.len() >= b.len();
    let (indexed, queried) = if a_is_indexed { (a, b) } else { (b, a) };

    let index = SpatialIndex::build(
        config.backend,
        indexed.system().coordinates(),
        Some(indexed.indices()),
        config.radius,
    )?;
    let (query_atoms, query_points) =
        collect_points(queried.system().coordinates(), Some(queried.indices()))?;

    let contacts = index
        .query_within_set(&query_points, config.radius)?
        .into_iter()
        .map(|n| {
            let queried_atom = query_atoms[n.query];
            let (index_a, index_b) = if a_is_indexed {
                (n.index, queried_atom)
            } else {
                (queried_atom, n.index)
            };
            Contact {
                index_a,
                index_b,
                distance: n.distance,
            }
        })
        .collect();
    Ok(contacts)
}

fn self_contacts(a: &AtomSet<'_>, config: &ContactsConfig) -> Result<Vec<Contact>, SelectionError> {
    if a.len() < 2 {
        return Ok(Vec::new());
    }
    let coordinates = a.system().coordinates();
    let resindices = a.system().resindices();
    let index = SpatialIndex::build(config.backend, coordinates, Some(a.indices()), config.radius)?;
    let (atoms, points) = collect_points(coordinates, Some(a.indices()))?;

    let contacts = index
        .query_within_set(&points, config.radius)?
        .into_iter()
        .filter_map(|n| {
            let i = atoms[n.query];
            let j = n.index;
            let keep = i < j
                && (config.same_residue == SameResiduePolicy::Include
                    || resindices[i] != resindices[j]);
            keep.then_some(Contact {
                index_a: i,
                index_b: j,
                distance: n.distance,
            })
        })
        .collect();
    Ok(contacts)
}

/// Masks of the atoms taking part in `contacts`, on the first and second side.
///
/// In self mode pass `a` for both sets.
pub fn contact_masks(contacts: &[Contact], a: &AtomSet<'_>, b: &AtomSet<'_>) -> (Mask, Mask) {
    let mut side_a = Mask::none(a.system().len());
    let mut side_b = Mask::none(b.system().len());
    for contact in contacts {
        side_a.set(contact.index_a, true);
        side_b.set(contact.index_b, true);
    }
    (side_a, side_b)
}
