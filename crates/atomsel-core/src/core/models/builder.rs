use super::atom::Atom;
use super::system::{AtomicSystem, BuildError, Columns};

/// Incrementally assembles an [`AtomicSystem`] from [`Atom`] records.
///
/// An optional attribute becomes a column when the first atom carries it;
/// every later (and earlier) atom must carry it too, otherwise `build` fails.
#[derive(Debug, Default)]
pub struct AtomicSystemBuilder {
    atoms: Vec<Atom>,
}

impl AtomicSystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            atoms: Vec::with_capacity(capacity),
        }
    }

    pub fn add_atom(&mut self, atom: Atom) -> &mut Self {
        self.atoms.push(atom);
        self
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Consumes the collected atoms and produces the system.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::IncompleteColumn`] if an optional attribute is set
    /// on some atoms but not on others.
    pub fn build(self) -> Result<AtomicSystem, BuildError> {
        let atoms = self.atoms;
        let columns = Columns {
            elements: optional_column("element", &atoms, |a| a.element.clone())?,
            segments: optional_column("segment", &atoms, |a| a.segment.clone())?,
            serials: optional_column("serial", &atoms, |a| a.serial)?,
            occupancies: optional_column("occupancy", &atoms, |a| a.occupancy)?,
            betas: optional_column("beta", &atoms, |a| a.beta)?,
            charges: optional_column("charge", &atoms, |a| a.charge)?,
            masses: optional_column("mass", &atoms, |a| a.mass)?,
            names: atoms.iter().map(|a| a.name.clone()).collect(),
            resnames: atoms.iter().map(|a| a.resname.clone()).collect(),
            resnums: atoms.iter().map(|a| a.resnum).collect(),
            chains: atoms.iter().map(|a| a.chain.clone()).collect(),
            coordinates: atoms.iter().map(|a| a.position).collect(),
        };
        AtomicSystem::from_columns(columns)
    }
}

fn optional_column<T, F>(
    column: &'static str,
    atoms: &[Atom],
    get: F,
) -> Result<Option<Vec<T>>, BuildError>
where
    F: Fn(&Atom) -> Option<T>,
{
    let Some(first) = atoms.first() else {
        return Ok(None);
    };
    if get(first).is_none() {
        // Absent on the first atom: the column exists only if some later atom sets it.
        return if atoms.iter().any(|a| get(a).is_some()) {
            Err(BuildError::IncompleteColumn { column, atom: 0 })
        } else {
            Ok(None)
        };
    }
    atoms
        .iter()
        .enumerate()
        .map(|(atom, a)| get(a).ok_or(BuildError::IncompleteColumn { column, atom }))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
