//! Typed bindings for infrastructure module variables.
//!
//! Variable type constraints (`object({...})`, `list(string)`,
//! `optional(bool)`, ...) are lexed and parsed into a [`ast::Type`] tree, then
//! flattened by [`lower::build_records`] into named [`ir::RecordDefinition`]s
//! that [`codegen::Codegen`] renders as Go structs.

pub mod ast;
pub mod cli;
pub mod codegen;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod lower;
pub mod manifest;
pub mod parser;

pub use error::{Error, Result};
pub use lower::build_records;
pub use parser::parse_type;
