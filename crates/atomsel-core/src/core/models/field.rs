use std::fmt;

/// Per-atom text attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextField {
    /// Atom name (e.g., "CA", "OW").
    Name,
    /// Residue name (e.g., "ALA", "HOH").
    Resname,
    /// Chain identifier.
    Chain,
    /// Element symbol. Optional column.
    Element,
    /// Segment identifier. Optional column.
    Segment,
}

/// Per-atom integer attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntegerField {
    /// Residue sequence number from the source structure.
    Resnum,
    /// Atom serial number. Optional column.
    Serial,
    /// Zero-based atom index, always available.
    Index,
    /// Zero-based contiguous residue index, always available.
    Resindex,
}

/// Per-atom floating point attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatField {
    Occupancy,
    Beta,
    Charge,
    Mass,
    X,
    Y,
    Z,
}

/// The value type carried by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
}

/// A closed enumeration of every attribute a selection can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Text(TextField),
    Integer(IntegerField),
    Float(FloatField),
}

impl TextField {
    pub fn name(self) -> &'static str {
        match self {
            TextField::Name => "name",
            TextField::Resname => "resname",
            TextField::Chain => "chain",
            TextField::Element => "element",
            TextField::Segment => "segment",
        }
    }
}

impl IntegerField {
    pub fn name(self) -> &'static str {
        match self {
            IntegerField::Resnum => "resnum",
            IntegerField::Serial => "serial",
            IntegerField::Index => "index",
            IntegerField::Resindex => "resindex",
        }
    }
}

impl FloatField {
    pub fn name(self) -> &'static str {
        match self {
            FloatField::Occupancy => "occupancy",
            FloatField::Beta => "beta",
            FloatField::Charge => "charge",
            FloatField::Mass => "mass",
            FloatField::X => "x",
            FloatField::Y => "y",
            FloatField::Z => "z",
        }
    }
}

impl Field {
    /// Canonical (lowercase) name of the field as written in selections.
    pub fn name(self) -> &'static str {
        match self {
            Field::Text(f) => f.name(),
            Field::Integer(f) => f.name(),
            Field::Float(f) => f.name(),
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            Field::Text(_) => ValueKind::Text,
            Field::Integer(_) => ValueKind::Integer,
            Field::Float(_) => ValueKind::Float,
        }
    }

    /// Whether the field is computed from other data and always available.
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            Field::Integer(IntegerField::Index | IntegerField::Resindex)
                | Field::Float(FloatField::X | FloatField::Y | FloatField::Z)
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
        })
    }
}
