//! Turn a repository's dependency manifests into a cocktail ontology.
//!
//! Manifests are parsed by [`analyzer`] extractors into typed ingredient
//! buckets, folded by [`aggregator`], deduplicated by [`merge`], reshaped by
//! [`normalizer`] and emitted as ontology text by [`ontology::emitter`]. The
//! text parses back through [`ontology::parser`] and compiles to Graphviz
//! DOT in [`ontology::dot`]. [`pipeline`] chains the whole thing.

pub mod aggregator;
pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod merge;
pub mod models;
pub mod normalizer;
pub mod ontology;
pub mod pipeline;
pub mod report;
