use std::collections::HashSet;

use anyhow::Result;
use regex::Regex;

use super::buckets;
use crate::classifier::classify;
use crate::models::{BucketMap, Ingredient, IngredientType};

/// Module path without its major-version suffix (`/v2`, `/v3.1`).
fn module_name<'a>(re: &Regex, path: &'a str) -> &'a str {
    re.captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(path)
}

fn major_version_re() -> Result<Regex> {
    Ok(Regex::new(r"^(.*?)(?:/v\d+(?:\.\d+)*)?$")?)
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    TopLevel,
    Require,
    Tool,
    Skipped,
}

/// Extractor for `go.mod`.
///
/// `require` directives (single line or block) are `necessary`, or
/// `indirect` when marked `// indirect`. `tool` directives are Tools.
/// `replace`, `exclude` and `retract` blocks are skipped.
pub struct GoModExtractor;

impl GoModExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for GoModExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let major_re = major_version_re()?;
        let mut deps = BucketMap::new();
        let mut section = Section::TopLevel;

        let require = |deps: &mut BucketMap, spec: &str| {
            let (spec, indirect) = match spec.split_once("//") {
                Some((spec, comment)) => (spec, comment.trim() == "indirect"),
                None => (spec, false),
            };
            let fields: Vec<&str> = spec.split_whitespace().collect();
            if fields.len() < 2 {
                tracing::warn!("go.mod: not a requirement: {}", spec.trim());
                return;
            }
            let name = module_name(&major_re, fields[0]);
            let bucket = if indirect {
                buckets::INDIRECT
            } else {
                buckets::NECESSARY
            };
            deps.push(bucket, classify(name));
        };

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if section != Section::TopLevel {
                if line == ")" {
                    section = Section::TopLevel;
                    continue;
                }
                match section {
                    Section::Require => require(&mut deps, line),
                    Section::Tool => deps.push(buckets::TOOLS, tool(line)),
                    _ => {}
                }
                continue;
            }

            let (directive, rest) = match line.split_once(char::is_whitespace) {
                Some((directive, rest)) => (directive, rest.trim()),
                None => (line, ""),
            };
            let opens_block = rest == "(";
            match directive {
                "require" if opens_block => section = Section::Require,
                "require" => require(&mut deps, rest),
                "tool" if opens_block => section = Section::Tool,
                "tool" => deps.push(buckets::TOOLS, tool(rest)),
                _ if opens_block => section = Section::Skipped,
                _ => {}
            }
        }

        Ok(deps)
    }
}

fn tool(path: &str) -> Ingredient {
    let path = path.split("//").next().unwrap_or(path).trim();
    Ingredient::new(path, IngredientType::Tool)
}

/// Extractor for `go.sum`: one entry per module, first occurrence wins.
pub struct GoSumExtractor;

impl GoSumExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for GoSumExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let major_re = major_version_re()?;
        let mut deps = BucketMap::new();
        let mut seen: HashSet<String> = HashSet::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 2 {
                tracing::warn!("go.sum: not a checksum line: {}", line);
                continue;
            }
            let name = module_name(&major_re, fields[0]);
            if seen.insert(name.to_string()) {
                deps.push(buckets::LOCKFILE, classify(name));
            }
        }

        Ok(deps)
    }
}
