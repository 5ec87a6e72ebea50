//! # Core Models Module
//!
//! Data structures describing the flat atomic system that selections are
//! evaluated against.
//!
//! ## Key Components
//!
//! - [`atom`] - A single atom record used while assembling a system
//! - [`builder`] - Incremental construction of a system from atom records
//! - [`field`] - The closed set of per-atom attributes a selection can address
//! - [`system`] - The column-oriented atomic system with its version stamp
//!
//! ## Usage
//!
//! ```
//! use atomsel::core::models::{atom::Atom, builder::AtomicSystemBuilder};
//! use nalgebra::Point3;
//!
//! let mut builder = AtomicSystemBuilder::new();
//! builder
//!     .add_atom(Atom::new("CA", "ALA", 1, "A", Point3::new(0.0, 0.0, 0.0)))
//!     .add_atom(Atom::new("OW", "HOH", 2, "W", Point3::new(3.0, 0.0, 0.0)));
//! let system = builder.build().unwrap();
//! assert_eq!(system.len(), 2);
//! ```

pub mod atom;
pub mod builder;
pub mod field;
pub mod system;
