//! Provides input/output for atom tables.
//!
//! An atom table is a CSV file with one row per atom, holding the same
//! columns as [`AtomicSystem`](crate::core::models::system::AtomicSystem).

pub mod table;
