//! Fixed residue and atom name tables backing the selection keywords.

pub mod identifiers;
