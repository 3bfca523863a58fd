use anyhow::Result;
use serde::Deserialize;
use serde_json::Map;

use super::buckets;
use crate::classifier::classify;
use crate::models::{Bucket, BucketMap};

#[derive(Debug, Deserialize)]
struct ComposerJson {
    #[serde(default)]
    require: Requirements,
    #[serde(default, rename = "require-dev")]
    require_dev: Requirements,
}

/// Package to constraint map. PHP encodes an empty one as `[]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Requirements {
    Map(Map<String, serde_json::Value>),
    Empty(Vec<serde_json::Value>),
}

impl Default for Requirements {
    fn default() -> Self {
        Requirements::Map(Map::new())
    }
}

impl Requirements {
    fn names(&self) -> impl Iterator<Item = &String> {
        let map = match self {
            Requirements::Map(map) => Some(map),
            Requirements::Empty(_) => None,
        };
        map.into_iter().flat_map(|m| m.keys())
    }
}

/// Extractor for `composer.json`.
///
/// Platform requirements (`php`, `ext-*`, `lib-*`, `composer-plugin-api`)
/// describe the runtime rather than packages and are skipped.
pub struct ComposerExtractor;

impl ComposerExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for ComposerExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let composer: ComposerJson = serde_json::from_str(text)?;
        let mut deps = BucketMap::new();

        for (packages, bucket) in [
            (&composer.require, buckets::NECESSARY),
            (&composer.require_dev, buckets::DEV),
        ] {
            let items: Vec<_> = packages
                .names()
                .filter(|name| !is_platform_package(name))
                .map(|name| classify(name))
                .collect();
            deps.insert(bucket, Bucket::List(items));
        }

        Ok(deps)
    }
}

fn is_platform_package(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == "php"
        || name.starts_with("php-")
        || name.starts_with("ext-")
        || name.starts_with("lib-")
        || name == "composer-plugin-api"
        || name == "composer-runtime-api"
}
