use nalgebra::Point3;

/// A single atom record used to assemble an [`AtomicSystem`](super::system::AtomicSystem).
///
/// Required attributes are plain fields; attributes backed by optional columns
/// are `Option`s. Within one system an optional attribute must be either set
/// on every atom or on none of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "N", "OW").
    pub name: String,
    /// The name of the parent residue (e.g., "ALA", "HOH").
    pub resname: String,
    /// The residue sequence number from the source structure.
    pub resnum: i64,
    /// The chain identifier. May be empty.
    pub chain: String,
    /// The 3D coordinates of the atom.
    pub position: Point3<f64>,
    /// The element symbol (e.g., "C", "FE").
    pub element: Option<String>,
    /// The segment identifier.
    pub segment: Option<String>,
    /// The atom serial number from the source structure.
    pub serial: Option<i64>,
    pub occupancy: Option<f64>,
    pub beta: Option<f64>,
    /// The partial charge in elementary charge units.
    pub charge: Option<f64>,
    /// The atomic mass in daltons.
    pub mass: Option<f64>,
}

impl Atom {
    /// Creates a new `Atom` with all optional attributes unset.
    ///
    /// # Arguments
    ///
    /// * `name` - The atom name.
    /// * `resname` - The residue name.
    /// * `resnum` - The residue number.
    /// * `chain` - The chain identifier.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(
        name: &str,
        resname: &str,
        resnum: i64,
        chain: &str,
        position: Point3<f64>,
    ) -> Self {
        Self {
            name: name.to_string(),
            resname: resname.to_string(),
            resnum,
            chain: chain.to_string(),
            position,
            element: None,
            segment: None,
            serial: None,
            occupancy: None,
            beta: None,
            charge: None,
            mass: None,
        }
    }

    pub fn with_element(mut self, element: &str) -> Self {
        self.element = Some(element.to_string());
        self
    }

    pub fn with_segment(mut self, segment: &str) -> Self {
        self.segment = Some(segment.to_string());
        self
    }

    pub fn with_serial(mut self, serial: i64) -> Self {
        self.serial = Some(serial);
        self
    }

    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = Some(occupancy);
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }
}
