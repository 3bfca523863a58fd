//! Report renderers.
//!
//! - [`terminal`]: summary box plus an ingredient table; `--verbose` lists libraries too.

pub mod terminal;
