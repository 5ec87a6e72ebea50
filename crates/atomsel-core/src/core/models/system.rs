use super::atom::Atom;
use super::field::{Field, FloatField, IntegerField, TextField};
use nalgebra::Point3;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Draws a fresh version stamp. Stamps are unique across every system in the process.
fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Column '{column}' has {found} entries, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Optional column '{column}' is missing a value for atom {atom}")]
    IncompleteColumn { column: &'static str, atom: usize },

    #[error("Field '{field}' is derived from other data and cannot be assigned")]
    DerivedField { field: &'static str },
}

/// Raw per-atom columns used to construct an [`AtomicSystem`] in one step.
///
/// Required columns are plain vectors; optional columns are `None` when the
/// source carries no such attribute.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    pub names: Vec<String>,
    pub resnames: Vec<String>,
    pub resnums: Vec<i64>,
    pub chains: Vec<String>,
    pub coordinates: Vec<Point3<f64>>,
    pub elements: Option<Vec<String>>,
    pub segments: Option<Vec<String>>,
    pub serials: Option<Vec<i64>>,
    pub occupancies: Option<Vec<f64>>,
    pub betas: Option<Vec<f64>>,
    pub charges: Option<Vec<f64>>,
    pub masses: Option<Vec<f64>>,
}

/// An immutable-per-query view of N atoms: typed attribute columns, coordinates
/// and a version stamp.
///
/// Every column holds exactly N entries. Any mutation draws a new version
/// stamp, which invalidates selection caches and spatial indices built against
/// the previous one. Mutation requires `&mut self`, so a system can never
/// change while a query holds a shared borrow of it.
#[derive(Debug, Clone)]
pub struct AtomicSystem {
    names: Vec<String>,
    resnames: Vec<String>,
    resnums: Vec<i64>,
    chains: Vec<String>,
    elements: Option<Vec<String>>,
    segments: Option<Vec<String>>,
    serials: Option<Vec<i64>>,
    occupancies: Option<Vec<f64>>,
    betas: Option<Vec<f64>>,
    charges: Option<Vec<f64>>,
    masses: Option<Vec<f64>>,
    /// Contiguous residue index for every atom.
    resindices: Vec<usize>,
    residue_count: usize,
    coordinates: Vec<Point3<f64>>,
    version: u64,
}

impl Default for AtomicSystem {
    fn default() -> Self {
        Self::empty()
    }
}

impl AtomicSystem {
    /// Creates a system with zero atoms.
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            resnames: Vec::new(),
            resnums: Vec::new(),
            chains: Vec::new(),
            elements: None,
            segments: None,
            serials: None,
            occupancies: None,
            betas: None,
            charges: None,
            masses: None,
            resindices: Vec::new(),
            residue_count: 0,
            coordinates: Vec::new(),
            version: next_version(),
        }
    }

    /// Builds a system from raw columns.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ColumnLength`] if any column length differs from
    /// the number of names.
    pub fn from_columns(columns: Columns) -> Result<Self, BuildError> {
        let n = columns.names.len();
        check_len("resname", n, columns.resnames.len())?;
        check_len("resnum", n, columns.resnums.len())?;
        check_len("chain", n, columns.chains.len())?;
        check_len("coordinates", n, columns.coordinates.len())?;
        check_optional_len("element", n, columns.elements.as_ref())?;
        check_optional_len("segment", n, columns.segments.as_ref())?;
        check_optional_len("serial", n, columns.serials.as_ref())?;
        check_optional_len("occupancy", n, columns.occupancies.as_ref())?;
        check_optional_len("beta", n, columns.betas.as_ref())?;
        check_optional_len("charge", n, columns.charges.as_ref())?;
        check_optional_len("mass", n, columns.masses.as_ref())?;

        let mut system = Self {
            names: columns.names,
            resnames: columns.resnames,
            resnums: columns.resnums,
            chains: columns.chains,
            elements: columns.elements,
            segments: columns.segments,
            serials: columns.serials,
            occupancies: columns.occupancies,
            betas: columns.betas,
            charges: columns.charges,
            masses: columns.masses,
            resindices: Vec::new(),
            residue_count: 0,
            coordinates: columns.coordinates,
            version: next_version(),
        };
        system.assign_residues();
        Ok(system)
    }

    /// Returns the number of atoms.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the current version stamp.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn coordinates(&self) -> &[Point3<f64>] {
        &self.coordinates
    }

    pub fn position(&self, index: usize) -> Option<&Point3<f64>> {
        self.coordinates.get(index)
    }

    /// Returns the contiguous residue index of every atom.
    ///
    /// Consecutive atoms sharing chain, residue number, residue name and
    /// segment belong to the same residue.
    pub fn resindices(&self) -> &[usize] {
        &self.resindices
    }

    pub fn residue_count(&self) -> usize {
        self.residue_count
    }

    /// Whether the system carries a column for `field`.
    pub fn has_field(&self, field: Field) -> bool {
        match field {
            Field::Text(f) => self.text_column(f).is_some(),
            Field::Integer(IntegerField::Serial) => self.serials.is_some(),
            Field::Integer(_) => true,
            Field::Float(f) => self.float_column(f).is_some(),
        }
    }

    /// Returns a text column, or `None` when the optional column is absent.
    pub fn text_column(&self, field: TextField) -> Option<&[String]> {
        match field {
            TextField::Name => Some(&self.names),
            TextField::Resname => Some(&self.resnames),
            TextField::Chain => Some(&self.chains),
            TextField::Element => self.elements.as_deref(),
            TextField::Segment => self.segments.as_deref(),
        }
    }

    /// Returns an integer column. Derived columns are materialized on demand.
    pub fn integer_column(&self, field: IntegerField) -> Option<Cow<'_, [i64]>> {
        match field {
            IntegerField::Resnum => Some(Cow::Borrowed(&self.resnums)),
            IntegerField::Serial => self.serials.as_deref().map(Cow::Borrowed),
            IntegerField::Index => Some(Cow::Owned((0..self.len() as i64).collect())),
            IntegerField::Resindex => Some(Cow::Owned(
                self.resindices.iter().map(|&r| r as i64).collect(),
            )),
        }
    }

    /// Returns a float column. Coordinate components are materialized on demand.
    pub fn float_column(&self, field: FloatField) -> Option<Cow<'_, [f64]>> {
        match field {
            FloatField::Occupancy => self.occupancies.as_deref().map(Cow::Borrowed),
            FloatField::Beta => self.betas.as_deref().map(Cow::Borrowed),
            FloatField::Charge => self.charges.as_deref().map(Cow::Borrowed),
            FloatField::Mass => self.masses.as_deref().map(Cow::Borrowed),
            FloatField::X => Some(Cow::Owned(self.coordinates.iter().map(|p| p.x).collect())),
            FloatField::Y => Some(Cow::Owned(self.coordinates.iter().map(|p| p.y).collect())),
            FloatField::Z => Some(Cow::Owned(self.coordinates.iter().map(|p| p.z).collect())),
        }
    }

    /// Reassembles the atom record at `index`.
    pub fn atom(&self, index: usize) -> Option<Atom> {
        if index >= self.len() {
            return None;
        }
        Some(Atom {
            name: self.names[index].clone(),
            resname: self.resnames[index].clone(),
            resnum: self.resnums[index],
            chain: self.chains[index].clone(),
            position: self.coordinates[index],
            element: self.elements.as_ref().map(|c| c[index].clone()),
            segment: self.segments.as_ref().map(|c| c[index].clone()),
            serial: self.serials.as_ref().map(|c| c[index]),
            occupancy: self.occupancies.as_ref().map(|c| c[index]),
            beta: self.betas.as_ref().map(|c| c[index]),
            charge: self.charges.as_ref().map(|c| c[index]),
            mass: self.masses.as_ref().map(|c| c[index]),
        })
    }

    /// Replaces all coordinates, e.g. when loading a new trajectory frame.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ColumnLength`] if the number of coordinates differs
    /// from the number of atoms.
    pub fn set_coordinates(&mut self, coordinates: Vec<Point3<f64>>) -> Result<(), BuildError> {
        check_len("coordinates", self.len(), coordinates.len())?;
        self.coordinates = coordinates;
        self.version = next_version();
        Ok(())
    }

    /// Edits coordinates in place and bumps the version stamp afterwards.
    pub fn update_coordinates<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut [Point3<f64>]),
    {
        edit(&mut self.coordinates);
        self.version = next_version();
    }

    /// Replaces (or adds, for optional fields) a text column.
    pub fn set_text_column(
        &mut self,
        field: TextField,
        values: Vec<String>,
    ) -> Result<(), BuildError> {
        check_len(field.name(), self.len(), values.len())?;
        match field {
            TextField::Name => self.names = values,
            TextField::Resname => self.resnames = values,
            TextField::Chain => self.chains = values,
            TextField::Element => self.elements = Some(values),
            TextField::Segment => self.segments = Some(values),
        }
        if field != TextField::Name && field != TextField::Element {
            self.assign_residues();
        }
        self.version = next_version();
        Ok(())
    }

    /// Replaces (or adds, for optional fields) an integer column.
    pub fn set_integer_column(
        &mut self,
        field: IntegerField,
        values: Vec<i64>,
    ) -> Result<(), BuildError> {
        match field {
            IntegerField::Index | IntegerField::Resindex => {
                return Err(BuildError::DerivedField {
                    field: field.name(),
                });
            }
            IntegerField::Resnum => {
                check_len(field.name(), self.len(), values.len())?;
                self.resnums = values;
                self.assign_residues();
            }
            IntegerField::Serial => {
                check_len(field.name(), self.len(), values.len())?;
                self.serials = Some(values);
            }
        }
        self.version = next_version();
        Ok(())
    }

    /// Replaces (or adds) a float column. Coordinate components are rejected;
    /// use [`AtomicSystem::set_coordinates`] instead.
    pub fn set_float_column(
        &mut self,
        field: FloatField,
        values: Vec<f64>,
    ) -> Result<(), BuildError> {
        let slot = match field {
            FloatField::Occupancy => &mut self.occupancies,
            FloatField::Beta => &mut self.betas,
            FloatField::Charge => &mut self.charges,
            FloatField::Mass => &mut self.masses,
            FloatField::X | FloatField::Y | FloatField::Z => {
                return Err(BuildError::DerivedField {
                    field: field.name(),
                });
            }
        };
        check_len(field.name(), self.names.len(), values.len())?;
        *slot = Some(values);
        self.version = next_version();
        Ok(())
    }

    fn assign_residues(&mut self) {
        let n = self.len();
        let mut resindices = Vec::with_capacity(n);
        let mut current = 0usize;
        for i in 0..n {
            if i > 0 && !self.same_residue_key(i - 1, i) {
                current += 1;
            }
            resindices.push(current);
        }
        self.residue_count = if n == 0 { 0 } else { current + 1 };
        self.resindices = resindices;
    }

    fn same_residue_key(&self, a: usize, b: usize) -> bool {
        self.chains[a] == self.chains[b]
            && self.resnums[a] == self.resnums[b]
            && self.resnames[a] == self.resnames[b]
            && self
                .segments
                .as_ref()
                .is_none_or(|segments| segments[a] == segments[b])
    }
}

fn check_len(column: &'static str, expected: usize, found: usize) -> Result<(), BuildError> {
    if expected == found {
        Ok(())
    } else {
        Err(BuildError::ColumnLength {
            column,
            expected,
            found,
        })
    }
}

fn check_optional_len<T>(
    column: &'static str,
    expected: usize,
    values: Option<&Vec<T>>,
) -> Result<(), BuildError> {
    match values {
        Some(values) => check_len(column, expected, values.len()),
        None => Ok(()),
    }
}
