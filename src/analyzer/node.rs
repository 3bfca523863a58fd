use std::collections::HashSet;

use anyhow::Result;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use super::buckets;
use crate::classifier::classify;
use crate::models::{Bucket, BucketMap, Ingredient, IngredientType};

/// Extractor for `package.json`.
///
/// Reads `dependencies`, `devDependencies`, `peerDependencies`,
/// `bundledDependencies` (or `bundleDependencies`), `optionalDependencies`
/// and the `os` list. Blocked platforms (`"!win32"`) are not resources.
pub struct PackageJsonExtractor;

impl PackageJsonExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for PackageJsonExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let json: Value = serde_json::from_str(text)?;
        let git_re = Regex::new(r"^git(?:\+ssh|\+https?|\+file)?://")?;
        let mut deps = BucketMap::new();

        let accept = |name: &str, section: &str| -> Option<Ingredient> {
            let name = name.trim();
            if git_re.is_match(name) {
                tracing::warn!("package.json: skipping git-hosted {} entry: {}", section, name);
                None
            } else {
                Some(classify(name))
            }
        };

        for (section, bucket) in [
            ("dependencies", buckets::NECESSARY),
            ("devDependencies", buckets::DEV),
            ("peerDependencies", buckets::PEER),
        ] {
            if let Some(pkgs) = json.get(section).and_then(|v| v.as_object()) {
                let items: Vec<_> = pkgs.keys().filter_map(|n| accept(n, section)).collect();
                deps.insert(bucket, Bucket::List(items));
            }
        }

        // Arrays of names; a boolean means "bundle everything" and names nothing.
        for section in ["bundledDependencies", "bundleDependencies"] {
            if let Some(pkgs) = json.get(section).and_then(|v| v.as_array()) {
                let items: Vec<_> = pkgs
                    .iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(|n| accept(n, section))
                    .collect();
                let mut bundled = BucketMap::new();
                bundled.insert(buckets::BUNDLED, Bucket::List(items));
                deps.merge(bundled)?;
            }
        }

        if let Some(pkgs) = json.get("optionalDependencies").and_then(|v| v.as_object()) {
            let items: Vec<_> = pkgs
                .keys()
                .filter_map(|n| accept(n, "optionalDependencies"))
                .collect();
            if !items.is_empty() {
                deps.insert(
                    buckets::OPTIONAL,
                    Bucket::Groups(IndexMap::from([(buckets::UNGROUPED.to_string(), items)])),
                );
            }
        }

        if let Some(systems) = json.get("os").and_then(|v| v.as_array()) {
            let items: Vec<_> = systems
                .iter()
                .filter_map(|v| v.as_str())
                .filter(|os| !os.is_empty() && !os.starts_with('!'))
                .map(|os| Ingredient::new(os, IngredientType::Resource))
                .collect();
            deps.insert(buckets::OS, Bucket::List(items));
        }

        Ok(deps)
    }
}

/// Extractor for `yarn.lock`, classic (v1) and berry formats.
///
/// A package declared under several version ranges is reported once.
pub struct YarnLockExtractor;

impl YarnLockExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for YarnLockExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let mut deps = BucketMap::new();
        let mut seen: HashSet<String> = HashSet::new();

        for line in text.lines() {
            // Skip comments, blank lines and indented entry bodies
            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with(' ')
                || line.starts_with('\t')
            {
                continue;
            }
            let header = line.trim_end().trim_end_matches(':');
            if header == "__metadata" {
                continue;
            }

            // Comma-separated specs share one entry: take the first
            let first_spec = header.split(", ").next().unwrap_or(header).trim_matches('"');

            match package_name(first_spec) {
                Some(name) if first_spec.contains("@workspace:") => {
                    tracing::debug!("yarn.lock: skipping workspace package {}", name);
                }
                Some(name) => {
                    if seen.insert(name.to_string()) {
                        deps.push(buckets::LOCKFILE, classify(name));
                    }
                }
                None => tracing::warn!("yarn.lock: not a package entry: {}", line),
            }
        }

        Ok(deps)
    }
}

/// Name part of a `name@range` spec; scoped names keep their leading `@`.
fn package_name(spec: &str) -> Option<&str> {
    let offset = usize::from(spec.starts_with('@'));
    let at = spec[offset..].find('@')? + offset;
    let name = &spec[..at];
    if name.is_empty() || name == "@" {
        None
    } else {
        Some(name)
    }
}

/// Extractor for `package-lock.json` (v1 `dependencies`, v2/v3 `packages`).
pub struct PackageLockExtractor;

impl PackageLockExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for PackageLockExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let json: Value = serde_json::from_str(text)?;
        let mut deps = BucketMap::new();
        let mut seen: HashSet<String> = HashSet::new();

        if let Some(packages) = json.get("packages").and_then(|v| v.as_object()) {
            for pkg_path in packages.keys() {
                // The root project is the empty key
                if pkg_path.is_empty() {
                    continue;
                }
                // "node_modules/a/node_modules/@scope/b" → "@scope/b"
                let name = match pkg_path.rfind("node_modules/") {
                    Some(idx) => &pkg_path[idx + "node_modules/".len()..],
                    None => pkg_path.as_str(),
                };
                if !name.is_empty() && seen.insert(name.to_string()) {
                    deps.push(buckets::LOCKFILE, classify(name));
                }
            }
        } else if let Some(dependencies) = json.get("dependencies").and_then(|v| v.as_object()) {
            for name in dependencies.keys() {
                if seen.insert(name.clone()) {
                    deps.push(buckets::LOCKFILE, classify(name));
                }
            }
        }

        Ok(deps)
    }
}
