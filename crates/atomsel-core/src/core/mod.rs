//! # Core Module
//!
//! The stateless foundation of the library: the atomic system selections are
//! evaluated against, and the selection language itself.
//!
//! ## Architecture
//!
//! - **Atomic Representation** ([`models`]) - Atoms, the column-oriented system and its builder
//! - **Selection Language** ([`select`]) - Tokenizer, parser and syntax tree
//! - **File I/O** ([`io`]) - Reading and writing atom tables
//! - **Name Tables** ([`utils`]) - Residue and atom name classification behind the keywords
//!
//! Nothing here caches or indexes; that is the job of [`crate::engine`].

pub mod io;
pub mod models;
pub mod select;
pub mod utils;
