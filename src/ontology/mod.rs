//! The ontology description language: emission, parsing and graph output.
//!
//! The emitter produces an [`ast::Document`] that renders as text; the
//! parser reads that text back into a document, and [`dot`] compiles a
//! document into Graphviz.

pub mod ast;
pub mod dot;
pub mod emitter;
pub mod parser;

pub use ast::{Document, Triple};
pub use emitter::{translate, Mode};
pub use parser::parse;
