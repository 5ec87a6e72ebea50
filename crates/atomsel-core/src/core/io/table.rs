use crate::core::models::atom::Atom;
use crate::core::models::builder::AtomicSystemBuilder;
use crate::core::models::field::{Field, FloatField, IntegerField, TextField};
use crate::core::models::system::{AtomicSystem, BuildError};
use crate::engine::mask::Mask;
use nalgebra::Point3;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Inconsistent atom table: {0}")]
    Build(#[from] BuildError),
    #[error("Mask covers {mask} atoms but the system has {atoms}")]
    MaskLength { mask: usize, atoms: usize },
}

/// One row of an atom table. Unknown columns such as `index` are ignored.
#[derive(Debug, Deserialize)]
struct AtomRow {
    name: String,
    resname: String,
    resnum: i64,
    chain: String,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default)]
    element: Option<String>,
    #[serde(default)]
    segment: Option<String>,
    #[serde(default)]
    serial: Option<i64>,
    #[serde(default)]
    occupancy: Option<f64>,
    #[serde(default)]
    beta: Option<f64>,
    #[serde(default)]
    charge: Option<f64>,
    #[serde(default)]
    mass: Option<f64>,
}

impl From<AtomRow> for Atom {
    fn from(row: AtomRow) -> Self {
        Atom {
            name: row.name,
            resname: row.resname,
            resnum: row.resnum,
            chain: row.chain,
            position: Point3::new(row.x, row.y, row.z),
            element: row.element,
            segment: row.segment,
            serial: row.serial,
            occupancy: row.occupancy,
            beta: row.beta,
            charge: row.charge,
            mass: row.mass,
        }
    }
}

/// Optional columns in output order.
const OPTIONAL_COLUMNS: [(&str, Field); 7] = [
    ("element", Field::Text(TextField::Element)),
    ("segment", Field::Text(TextField::Segment)),
    ("serial", Field::Integer(IntegerField::Serial)),
    ("occupancy", Field::Float(FloatField::Occupancy)),
    ("beta", Field::Float(FloatField::Beta)),
    ("charge", Field::Float(FloatField::Charge)),
    ("mass", Field::Float(FloatField::Mass)),
];

/// Reads an atom table from a CSV file.
///
/// The header must name `name`, `resname`, `resnum`, `chain`, `x`, `y` and `z`.
/// Optional columns may be present; an optional column with empty cells in
/// some rows but not others is rejected.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be opened, a row fails to parse,
/// or the optional columns are inconsistent.
pub fn read_table(path: &Path) -> Result<AtomicSystem, TableError> {
    let file = File::open(path).map_err(|e| TableError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    read_table_from(BufReader::new(file))
}

pub fn read_table_from(reader: impl Read) -> Result<AtomicSystem, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut builder = AtomicSystemBuilder::new();
    for row in reader.deserialize::<AtomRow>() {
        builder.add_atom(row?.into());
    }
    Ok(builder.build()?)
}

/// Writes the atoms selected by `mask` (all atoms when `None`) as CSV.
///
/// The first column is the atom index in `system`; optional columns are
/// written only when the system carries them. Returns the number of rows.
pub fn write_table(
    system: &AtomicSystem,
    mask: Option<&Mask>,
    writer: impl Write,
) -> Result<usize, TableError> {
    if let Some(mask) = mask
        && mask.len() != system.len()
    {
        return Err(TableError::MaskLength {
            mask: mask.len(),
            atoms: system.len(),
        });
    }

    let optional: Vec<&str> = OPTIONAL_COLUMNS
        .iter()
        .filter(|(_, field)| system.has_field(*field))
        .map(|(name, _)| *name)
        .collect();

    let mut writer = csv::Writer::from_writer(writer);
    let mut header = vec!["index", "name", "resname", "resnum", "chain", "x", "y", "z"];
    header.extend(&optional);
    writer.write_record(&header)?;

    let mut rows = 0;
    for index in (0..system.len()).filter(|&i| mask.is_none_or(|m| m.get(i))) {
        let Some(atom) = system.atom(index) else {
            continue;
        };
        let mut record = vec![
            index.to_string(),
            atom.name,
            atom.resname,
            atom.resnum.to_string(),
            atom.chain,
            atom.position.x.to_string(),
            atom.position.y.to_string(),
            atom.position.z.to_string(),
        ];
        for column in &optional {
            let cell = match *column {
                "element" => atom.element.clone().unwrap_or_default(),
                "segment" => atom.segment.clone().unwrap_or_default(),
                "serial" => display_or_empty(atom.serial),
                "occupancy" => display_or_empty(atom.occupancy),
                "beta" => display_or_empty(atom.beta),
                "charge" => display_or_empty(atom.charge),
                _ => display_or_empty(atom.mass),
            };
            record.push(cell);
        }
        writer.write_record(&record)?;
        rows += 1;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(rows)
}

fn display_or_empty<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
