//! # Engine Module
//!
//! Turns parsed selections into atom masks.
//!
//! ## Overview
//!
//! The engine is the stateful half of the library. It walks a [`Node`](crate::core::select::Node)
//! tree against an [`AtomicSystem`](crate::core::models::system::AtomicSystem), answering
//! proximity predicates through a spatial index and remembering sub-expression results
//! for as long as the system's version stays the same.
//!
//! ## Architecture
//!
//! - **Masks** ([`mask`]) - Per-atom boolean results and their set algebra
//! - **Evaluation** ([`evaluator`]) - The tree walk and the reusable [`evaluator::Evaluator`]
//! - **Caching** ([`cache`]) - Version-scoped masks keyed by canonical sub-expression text
//! - **Spatial Search** ([`spatial`]) - Grid and k-d tree neighbour search
//! - **Contacts** ([`contacts`]) - Atom pairs within a distance, between or inside sets
//! - **Configuration** ([`config`]) - Builders for evaluator and contact settings
//! - **Error Handling** ([`error`]) - The error type shared with the parser

pub mod cache;
pub mod config;
pub mod contacts;
pub mod error;
pub mod evaluator;
pub mod mask;
pub mod spatial;
