//! Typed errors for the two places where callers need to tell failures apart.
//!
//! Extraction and CLI failures use `anyhow` with context; these types cover
//! bucket folding and the ontology grammar.

use thiserror::Error;

/// Raised when two buckets with the same key have different shapes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BucketError {
    #[error("bucket '{key}' is a {existing} bucket, cannot merge a {incoming} bucket into it")]
    ShapeMismatch {
        key: String,
        existing: &'static str,
        incoming: &'static str,
    },
}

/// Failure to parse ontology description text.
///
/// The emitter is the only producer of this language, so any of these errors
/// points at an emitter defect rather than bad repository data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OdlError {
    #[error("syntax error at {line}:{column}: expected {expected}, found {found}")]
    Syntax {
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },

    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: String },
}
