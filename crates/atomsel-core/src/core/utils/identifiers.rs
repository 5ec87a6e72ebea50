use phf::{Set, phf_set};

static PROTEIN_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "HSD", "HSE", "HSP", "HID", "HIE", "HIP", "CYX", "CYM", "ASH", "GLH",
    "LYN", "MSE", "SEC", "PYL", "ACE", "NME",
};

static WATER_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "H2O", "DOD", "SOL", "TIP", "TIP3", "TIP4", "TIP5",
    "T3P", "T4P", "T5P", "SPC",
};

static NUCLEIC_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "A", "C", "G", "T", "U", "I",
    "DA", "DC", "DG", "DT", "DU", "DI",
    "RA", "RC", "RG", "RU",
    "ADE", "CYT", "GUA", "THY", "URA",
};

static ION_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "NA", "K", "LI", "RB", "CS", "CL", "BR", "IOD", "F",
    "MG", "CA", "ZN", "FE", "FE2", "MN", "CU", "CU1", "CO", "NI", "CD", "HG", "SR", "BA",
    "SOD", "POT", "CLA", "CAL", "CES", "LIT", "RUB", "ZN2",
};

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "CA", "C", "O", "OXT", "OT1", "OT2", "NT",
};

static BACKBONE_HYDROGEN_NAMES: Set<&'static str> = phf_set! {
    "H", "HN", "HA", "H1", "H2", "H3", "HT1", "HT2", "HT3",
    "HA1", "HA2", "HA3", "1HA", "2HA", "HC", "HOXT",
};

static ACIDIC_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "ASP", "GLU",
};

static BASIC_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "LYS", "ARG", "HIS", "HSP", "HIP",
};

static AROMATIC_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "PHE", "TYR", "TRP", "HIS", "HSD", "HSE", "HSP", "HID", "HIE", "HIP",
};

static HYDROPHOBIC_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "ALA", "ILE", "LEU", "MET", "PHE", "PRO", "TRP", "VAL", "MSE",
};

pub fn is_protein_residue(res_name: &str) -> bool {
    PROTEIN_RESIDUE_NAMES.contains(res_name.trim())
}

pub fn is_water_residue(res_name: &str) -> bool {
    WATER_RESIDUE_NAMES.contains(res_name.trim())
}

pub fn is_nucleic_residue(res_name: &str) -> bool {
    NUCLEIC_RESIDUE_NAMES.contains(res_name.trim())
}

pub fn is_ion_residue(res_name: &str) -> bool {
    ION_RESIDUE_NAMES.contains(res_name.trim())
}

pub fn is_acidic_residue(res_name: &str) -> bool {
    ACIDIC_RESIDUE_NAMES.contains(res_name.trim())
}

pub fn is_basic_residue(res_name: &str) -> bool {
    BASIC_RESIDUE_NAMES.contains(res_name.trim())
}

pub fn is_aromatic_residue(res_name: &str) -> bool {
    AROMATIC_RESIDUE_NAMES.contains(res_name.trim())
}

pub fn is_hydrophobic_residue(res_name: &str) -> bool {
    HYDROPHOBIC_RESIDUE_NAMES.contains(res_name.trim())
}

/// Backbone heavy atom names. Callers combine this with a protein residue check.
pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_backbone_hydrogen(atom_name: &str) -> bool {
    BACKBONE_HYDROGEN_NAMES.contains(atom_name.trim())
}

/// Decides whether an atom is a hydrogen (or deuterium).
///
/// The element symbol wins when present. Otherwise the first alphabetic
/// character of the name decides, so PDB-style names like "1HB" count too.
pub fn is_hydrogen(atom_name: &str, element: Option<&str>) -> bool {
    if let Some(element) = element.map(str::trim).filter(|e| !e.is_empty()) {
        return element.eq_ignore_ascii_case("H") || element.eq_ignore_ascii_case("D");
    }
    let first_letter = atom_name.trim().chars().find(|c| c.is_ascii_alphabetic());
    matches!(first_letter, Some('H') | Some('D'))
}
