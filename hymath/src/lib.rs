//! Structurally edited expression engine.
//!
//! Role
//! - Keep an arithmetic expression as one mutable tree whose nodes cache
//!   their inferred type and own lexically scoped variables.
//! - Edit that tree one token at a time through a cursor
//!   ([`parser::TreeParser`]), either interactively or from text.
//! - Evaluate it through overloaded, generically typed function registries.
//!
//! ```
//! use hymath::{catalog, parser::TreeParser, types::Value};
//!
//! let mut parser = TreeParser::new(catalog::all());
//! parser.parse_command("#number:1;+;#number:2;+;#number:3").unwrap();
//! assert_eq!(parser.evaluate(), Ok(Value::Number(6.0)));
//! ```
pub mod catalog;
pub mod display;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;
pub mod persist;
pub mod tree;
pub mod types;
