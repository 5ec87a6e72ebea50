//! # Selection Language
//!
//! Lexer, parser and syntax tree for atom selection expressions such as
//! `"protein and within 5 of water"` or `"chain A and resnum 10 to 50"`.
//!
//! Parsing is independent of any atomic system: field and keyword names are
//! resolved against fixed tables, and the resulting [`Node`] is evaluated
//! later by [`crate::engine::evaluator`].
//!
//! ```
//! use atomsel::core::select::parse;
//!
//! let tree = parse("resid 10:20 and name CA").unwrap();
//! assert_eq!(tree.to_string(), "(resnum 10 to 20 and name CA)");
//! assert!(parse("protein within 5 of water").is_err());
//! ```

pub mod ast;
pub mod error;
pub mod keywords;
pub mod parser;
pub mod token;

pub use ast::Node;
pub use error::SelectionError;
pub use parser::parse;
