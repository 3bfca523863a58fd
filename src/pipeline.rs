//! End-to-end generation for one repository snapshot.

use serde::Serialize;

use crate::aggregator::aggregate;
use crate::analyzer::ManifestKind;
use crate::config::{Config, GraphStyle};
use crate::error::OdlError;
use crate::merge::{dedup, MergedField};
use crate::models::{RepositoryRecord, RepositorySnapshot};
use crate::normalizer::normalize;
use crate::ontology::{dot, emitter, parser, Mode};

/// Everything produced for one repository.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub name: String,
    pub ingredient_count: usize,
    pub record: RepositoryRecord,
    /// Full cocktail ontology text.
    pub ontology: String,
    /// Cocktail Identity Card text.
    pub cic: String,
}

/// Extract, merge, normalize and emit both ontology texts.
pub fn generate(
    snapshot: &RepositorySnapshot,
    config: &Config,
    exclude: &[ManifestKind],
) -> Generation {
    let dependencies = dedup(&aggregate(snapshot, config, exclude), MergedField::default());
    let record = normalize(snapshot, dependencies);

    let ontology = emitter::translate(&record, Mode::Full);
    let cic = emitter::translate(&record, Mode::IdentityCard);
    tracing::info!(
        "{}: {} ingredients, {} ingredient types",
        record.name,
        record.ingredient_count,
        record.ingredient_types.len()
    );

    Generation {
        name: record.name.clone(),
        ingredient_count: record.ingredient_count,
        record,
        ontology,
        cic,
    }
}

/// Compile ontology text into a Graphviz digraph.
pub fn graph(text: &str, style: &GraphStyle) -> Result<String, OdlError> {
    let doc = parser::parse(text)?;
    Ok(dot::compile(&doc, style))
}
