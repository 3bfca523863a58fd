//! `cocktail`: describe a repository's dependency manifests as a cocktail ontology.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`cocktail::config::load_config`]).
//! 3. Scan the directory or load snapshot JSON ([`cocktail::detector`]).
//! 4. Run the pipeline for each snapshot ([`cocktail::pipeline::generate`]).
//! 5. Render the requested output; `dot` compiles the identity card graph.
//! 6. Exit `1` if a graph failed to compile.

mod cli;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, OutputFormat};
use cocktail::analyzer::ManifestKind;
use cocktail::config::load_config;
use cocktail::detector::{load_snapshots, scan_directory};
use cocktail::pipeline::{self, Generation};
use cocktail::report;

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cocktail={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let path = cli
        .path
        .canonicalize()
        .with_context(|| format!("cannot access {}", cli.path.display()))?;

    let config_root = if path.is_dir() {
        path.clone()
    } else {
        path.parent().map(|p| p.to_path_buf()).unwrap_or_default()
    };
    let config = load_config(&config_root, cli.config.as_deref())?;

    let snapshots = if path.is_dir() {
        vec![scan_directory(&path, &config)?]
    } else {
        load_snapshots(&path)?
    };

    let excluded: Vec<ManifestKind> = cli.exclude_manifest.iter().map(Into::into).collect();
    let generations: Vec<Generation> = snapshots
        .iter()
        .map(|snapshot| pipeline::generate(snapshot, &config, &excluded))
        .collect();

    let mut graph_failed = false;
    let rendered = match cli.format {
        OutputFormat::Terminal => {
            if cli.output.is_some() {
                tracing::warn!("--output is ignored for the terminal format");
            }
            for generation in &generations {
                report::terminal::render(generation, cli.verbose);
            }
            return Ok(());
        }
        OutputFormat::Json => {
            let json = if generations.len() == 1 {
                serde_json::to_string_pretty(&generations[0])?
            } else {
                serde_json::to_string_pretty(&generations)?
            };
            json + "\n"
        }
        OutputFormat::Ontology => concat(generations.iter().map(|g| g.ontology.clone())),
        OutputFormat::Cic => concat(generations.iter().map(|g| g.cic.clone())),
        OutputFormat::Dot => {
            let mut graphs = Vec::new();
            for generation in &generations {
                match pipeline::graph(&generation.cic, &config.graph) {
                    Ok(dot) => graphs.push(dot),
                    Err(e) => {
                        tracing::error!("graph unavailable for {}: {}", generation.name, e);
                        graph_failed = true;
                    }
                }
            }
            concat(graphs.into_iter())
        }
    };

    match &cli.output {
        Some(output) => {
            fs::write(output, &rendered)
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!("wrote {}", output.display());
        }
        None => print!("{}", rendered),
    }

    if graph_failed {
        std::process::exit(1);
    }

    Ok(())
}

fn concat(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join("\n")
}
