//! # Workflows Module
//!
//! High-level entry points that tie the selection language and the engine
//! together for one complete task each.
//!
//! - **Selection Workflow** ([`select`]) - Parse an expression and return the selected atoms
//!   together with its canonical form.
//! - **Contacts Workflow** ([`contacts`]) - Resolve one or two selections and find the atom
//!   pairs within a distance of each other.

pub mod contacts;
pub mod select;
