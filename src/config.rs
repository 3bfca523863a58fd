use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classifier::tfm::default_frameworks;

/// Root configuration structure, deserialized from `.cocktail/config.toml`.
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub dotnet: DotnetConfig,
    /// Bucket key (or `bucket.group`) to the task its ingredients serve.
    pub tasks: TaskConfig,
    pub graph: GraphStyle,
    pub scan: ScanConfig,
}

/// .NET framework detection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DotnetConfig {
    /// Repository languages that count as .NET languages. Frameworks found in
    /// project files are associated with the ones the repository uses.
    pub languages: Vec<String>,
    /// Framework family to target framework monikers.
    pub frameworks: IndexMap<String, Vec<String>>,
}

impl Default for DotnetConfig {
    fn default() -> Self {
        Self {
            languages: vec![
                "C#".to_string(),
                "F#".to_string(),
                "Visual Basic .NET".to_string(),
            ],
            frameworks: default_frameworks(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TaskConfig(pub IndexMap<String, String>);

impl Default for TaskConfig {
    fn default() -> Self {
        Self(IndexMap::from([
            ("devDependencies".to_string(), "development".to_string()),
            ("buildDependencies".to_string(), "build".to_string()),
            ("groups.test".to_string(), "testing".to_string()),
            ("groups.development".to_string(), "development".to_string()),
            ("optional.test".to_string(), "testing".to_string()),
        ]))
    }
}

/// Node and edge styling for the Graphviz output.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphStyle {
    pub concept_shape: String,
    pub concept_color: String,
    pub individual_shape: String,
    pub individual_color: String,
    /// Style of `iof` (instance-of) edges.
    pub instance_edge_style: String,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            concept_shape: "ellipse".to_string(),
            concept_color: "turquoise4".to_string(),
            individual_shape: "rectangle".to_string(),
            individual_color: "goldenrod".to_string(),
            instance_edge_style: "dashed".to_string(),
        }
    }
}

/// Local directory scanning settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names never descended into.
    pub ignore: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore: [
                ".git",
                "node_modules",
                "target",
                "vendor",
                ".venv",
                "venv",
                "__pycache__",
                "bin",
                "obj",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `<project_path>/.cocktail/config.toml`
/// 3. `~/.config/cocktail/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".cocktail").join("config.toml");
    if project_config.exists() {
        tracing::debug!("using config {}", project_config.display());
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("cocktail").join("config.toml");
        if home_config.exists() {
            tracing::debug!("using config {}", home_config.display());
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}
