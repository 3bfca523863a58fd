use std::collections::HashSet;

use anyhow::Result;
use indexmap::IndexMap;
use serde::Deserialize;

use super::buckets;
use crate::classifier::classify;
use crate::models::{Bucket, BucketMap, Ingredient};

/// Extractor for `Cargo.toml`.
///
/// Reads `[workspace.dependencies]`, `[dependencies]`, `[dev-dependencies]`
/// and `[build-dependencies]`. Each `[target.<cfg>]` table is read the
/// same way into a nested bucket map under `target`. A dependency renamed
/// with `package = "..."` is recorded under the real package name.
pub struct CargoTomlExtractor;

impl CargoTomlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for CargoTomlExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let manifest: toml::Table = toml::from_str(text)?;
        let mut deps = BucketMap::new();

        if let Some(workspace) = manifest.get("workspace").and_then(|v| v.as_table()) {
            deps.insert(
                buckets::WORKSPACE,
                Bucket::List(dependency_table(workspace.get("dependencies"))),
            );
        }
        deps.merge(sections(&manifest))?;

        Ok(deps)
    }
}

/// Dependency sections of a manifest or of one `[target.<cfg>]` table.
fn sections(table: &toml::Table) -> BucketMap {
    let mut deps = BucketMap::new();

    for (section, bucket) in [
        ("dependencies", buckets::NECESSARY),
        ("dev-dependencies", buckets::DEV),
        ("build-dependencies", buckets::BUILD),
    ] {
        deps.insert(bucket, Bucket::List(dependency_table(table.get(section))));
    }

    if let Some(targets) = table.get("target").and_then(|v| v.as_table()) {
        let nested: IndexMap<String, BucketMap> = targets
            .iter()
            .filter_map(|(cfg, spec)| {
                let spec = spec.as_table()?;
                let inner = sections(spec);
                (!inner.is_empty()).then(|| (cfg.clone(), inner))
            })
            .collect();
        deps.insert(buckets::TARGET, Bucket::Targets(nested));
    }

    deps
}

fn dependency_table(value: Option<&toml::Value>) -> Vec<Ingredient> {
    let Some(table) = value.and_then(|v| v.as_table()) else {
        return Vec::new();
    };
    table
        .iter()
        .map(|(key, spec)| {
            let name = spec
                .get("package")
                .and_then(|p| p.as_str())
                .unwrap_or(key.as_str());
            classify(name)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CargoLock {
    #[serde(default)]
    package: Vec<CargoLockPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoLockPackage {
    name: String,
    /// Packages without a `source` field are local workspace members.
    source: Option<String>,
}

/// Extractor for `Cargo.lock`; only registry and git packages are reported.
pub struct CargoLockExtractor;

impl CargoLockExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for CargoLockExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let lock: CargoLock = toml::from_str(text)?;
        let mut seen: HashSet<String> = HashSet::new();

        let items: Vec<_> = lock
            .package
            .into_iter()
            // Skip local workspace members (they have no `source`)
            .filter(|p| p.source.is_some())
            .filter(|p| seen.insert(p.name.clone()))
            .map(|p| classify(&p.name))
            .collect();

        let mut deps = BucketMap::new();
        deps.insert(buckets::LOCKFILE, Bucket::List(items));
        Ok(deps)
    }
}

#[cfg(test)]
mod tests {
    use super::super::Extractor;
    use super::*;

    fn names(deps: &BucketMap, key: &str) -> Vec<String> {
        match deps.get(key) {
            Some(Bucket::List(items)) => items.iter().map(|i| i.name.clone()).collect(),
            other => panic!("expected list bucket '{}', got {:?}", key, other),
        }
    }

    #[test]
    fn test_cargo_toml_sections() {
        let content = r#"
[package]
name = "demo"
version = "0.1.0"

[workspace]
members = ["crates/*"]

[workspace.dependencies]
serde = "1"

[dependencies]
anyhow = "1"
json = { package = "serde_json", version = "1" }

[dev-dependencies]
tempfile = "3"

[build-dependencies]
cc = "1"

[target.'cfg(windows)'.dependencies]
winapi = "0.3"

[target.'cfg(windows)'.dev-dependencies]
windows-sys = "0.52"

[target.'cfg(unix)'.dependencies]
libc = "0.2"
"#;
        let deps = CargoTomlExtractor::new().extract(content).unwrap();
        assert_eq!(names(&deps, buckets::WORKSPACE), vec!["serde"]);
        assert_eq!(names(&deps, buckets::NECESSARY), vec!["anyhow", "serde_json"]);
        assert_eq!(names(&deps, buckets::DEV), vec!["tempfile"]);
        assert_eq!(names(&deps, buckets::BUILD), vec!["cc"]);

        match deps.get(buckets::TARGET) {
            Some(Bucket::Targets(targets)) => {
                assert_eq!(
                    targets.keys().collect::<Vec<_>>(),
                    vec!["cfg(windows)", "cfg(unix)"]
                );
                let windows = &targets["cfg(windows)"];
                assert_eq!(names(windows, buckets::NECESSARY), vec!["winapi"]);
                assert_eq!(names(windows, buckets::DEV), vec!["windows-sys"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cargo_toml_invalid_fails() {
        assert!(CargoTomlExtractor::new().extract("[dependencies").is_err());
    }

    #[test]
    fn test_cargo_lock_skips_workspace_members() {
        let content = r#"
version = 3

[[package]]
name = "my-app"
version = "0.1.0"

[[package]]
name = "serde"
version = "1.0.150"
source = "registry+https://github.com/rust-lang/crates.io-index"
checksum = "abc123"

[[package]]
name = "tokio"
version = "1.25.0"
source = "registry+https://github.com/rust-lang/crates.io-index"
checksum = "def456"

[[package]]
name = "serde"
version = "0.9.15"
source = "registry+https://github.com/rust-lang/crates.io-index"
"#;
        let deps = CargoLockExtractor::new().extract(content).unwrap();
        assert_eq!(names(&deps, buckets::LOCKFILE), vec!["serde", "tokio"]);
    }

    #[test]
    fn test_cargo_toml_blank_rename() {
        let content = r#"
[dependencies]
serde = "1"
weird = { package = "", version = "1" }
"#;
        let deps = CargoTomlExtractor::new().extract(content).unwrap();
        assert_eq!(names(&deps, buckets::NECESSARY), vec!["serde"]);
    }
}
