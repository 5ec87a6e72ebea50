//! # atomsel
//!
//! An atom-selection query language for molecular structures, with spatial
//! proximity predicates and contact search.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** The flat `AtomicSystem` model, the selection
//!   language (tokenizer, parser, canonical syntax tree) and atom-table I/O.
//!   Parsing never looks at a system.
//!
//! - **[`engine`]: The Logic Core.** Evaluates syntax trees into masks. Owns the
//!   version-scoped selection cache, the grid and k-d tree spatial indices and the
//!   contacts facility.
//!
//! - **[`workflows`]: The Public API.** One call per task, such as selecting atoms
//!   from an expression or finding contacts between two selections.
//!
//! ```
//! use atomsel::core::models::{atom::Atom, builder::AtomicSystemBuilder};
//! use atomsel::engine::evaluator::Evaluator;
//! use nalgebra::Point3;
//!
//! let mut builder = AtomicSystemBuilder::new();
//! builder
//!     .add_atom(Atom::new("CA", "ALA", 1, "A", Point3::new(0.0, 0.0, 0.0)))
//!     .add_atom(Atom::new("OW", "HOH", 2, "W", Point3::new(3.0, 0.0, 0.0)))
//!     .add_atom(Atom::new("OW", "HOH", 3, "W", Point3::new(9.0, 0.0, 0.0)));
//! let system = builder.build().unwrap();
//!
//! let mask = Evaluator::new().select("water and within 5 of protein", &system).unwrap();
//! assert_eq!(mask.indices(), vec![1]);
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
