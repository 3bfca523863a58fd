use std::collections::HashSet;

use anyhow::Result;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use super::buckets;
use crate::classifier::{classify, Classifiers};
use crate::models::{Bucket, BucketMap, Ingredient, IngredientType};

/// Leading distribution name of a PEP 508 requirement string.
const REQUIREMENT_NAME: &str = r"^[A-Za-z0-9_\-.]+";

/// Extractor for `requirements.txt`.
///
/// URLs, local paths, archives and option lines are skipped; `-r` includes
/// are noted but not followed.
pub struct RequirementsExtractor;

impl RequirementsExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for RequirementsExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let include_re = Regex::new(r"^(?:-r|--requirement)\s*=?\s*(\S+)")?;
        let url_re = Regex::new(r"^(?:[a-z][a-z0-9+]*://|www\.)")?;
        let path_re = Regex::new(r"^(?:\.{1,2}/|/|~/)|^[\w\-.]+/|\.(?:whl|zip|tar\.gz|tar\.bz2|tgz)$")?;
        let name_re = Regex::new(REQUIREMENT_NAME)?;

        let mut deps = BucketMap::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(caps) = include_re.captures(line) {
                tracing::debug!("requirements.txt: includes {}", &caps[1]);
                continue;
            }
            if line.starts_with('-') || url_re.is_match(line) || path_re.is_match(line) {
                continue;
            }
            match name_re.find(line) {
                Some(m) => deps.push(buckets::NECESSARY, classify(m.as_str())),
                None => tracing::warn!("requirements.txt: not a dependency: {}", line),
            }
        }

        Ok(deps)
    }
}

#[derive(Debug, Deserialize)]
struct Pyproject {
    project: Option<PyprojectProject>,
    #[serde(default)]
    tool: toml::Table,
}

#[derive(Debug, Deserialize)]
struct PyprojectProject {
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default, rename = "optional-dependencies")]
    optional_dependencies: Option<OptionalDependencies>,
    #[serde(default)]
    classifiers: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OptionalDependencies {
    Groups(IndexMap<String, Vec<String>>),
    List(Vec<String>),
}

/// Extractor for `pyproject.toml` (PEP 621 `[project]` plus Poetry tables).
///
/// Trove classifiers such as `Framework :: Django` decide the type of a
/// matching dependency; every `[tool.*]` table is recorded as a Tool.
pub struct PyProjectExtractor;

impl PyProjectExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for PyProjectExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let pyproject: Pyproject = toml::from_str(text)?;
        let name_re = Regex::new(REQUIREMENT_NAME)?;
        let mut deps = BucketMap::new();

        let classifiers = match &pyproject.project {
            Some(project) => Classifiers::parse(&project.classifiers)?,
            None => Classifiers::default(),
        };

        let requirement = |raw: &str| -> Option<Ingredient> {
            match name_re.find(raw.trim()) {
                Some(m) => Some(classifiers.classify(m.as_str())),
                None => {
                    tracing::warn!("pyproject.toml: not a dependency: {}", raw);
                    None
                }
            }
        };

        if let Some(project) = &pyproject.project {
            let necessary: Vec<_> = project
                .dependencies
                .iter()
                .filter_map(|d| requirement(d.as_str()))
                .collect();
            deps.insert(buckets::NECESSARY, Bucket::List(necessary));

            let optional: IndexMap<String, Vec<Ingredient>> = match &project.optional_dependencies
            {
                Some(OptionalDependencies::Groups(groups)) => groups
                    .iter()
                    .map(|(group, reqs)| {
                        (
                            group.clone(),
                            reqs.iter().filter_map(|d| requirement(d.as_str())).collect(),
                        )
                    })
                    .collect(),
                Some(OptionalDependencies::List(reqs)) => IndexMap::from([(
                    buckets::UNGROUPED.to_string(),
                    reqs.iter().filter_map(|d| requirement(d.as_str())).collect(),
                )]),
                None => IndexMap::new(),
            };
            deps.insert(buckets::OPTIONAL, Bucket::Groups(optional));
        }

        if let Some(poetry) = pyproject.tool.get("poetry").and_then(|v| v.as_table()) {
            let names = |table: Option<&toml::Value>| -> Vec<Ingredient> {
                table
                    .and_then(|v| v.as_table())
                    .map(|t| {
                        t.keys()
                            .filter(|name| name.as_str() != "python")
                            .map(|name| classifiers.classify(name))
                            .collect()
                    })
                    .unwrap_or_default()
            };

            deps.merge(list_bucket(buckets::NECESSARY, names(poetry.get("dependencies"))))?;
            deps.merge(list_bucket(buckets::DEV, names(poetry.get("dev-dependencies"))))?;

            if let Some(groups) = poetry.get("group").and_then(|v| v.as_table()) {
                let groups: IndexMap<String, Vec<Ingredient>> = groups
                    .iter()
                    .map(|(group, spec)| (group.clone(), names(spec.get("dependencies"))))
                    .filter(|(_, items)| !items.is_empty())
                    .collect();
                let mut grouped = BucketMap::new();
                grouped.insert(buckets::GROUPS, Bucket::Groups(groups));
                deps.merge(grouped)?;
            }
        }

        let tools: Vec<_> = pyproject
            .tool
            .keys()
            .map(|name| Ingredient::new(name.as_str(), IngredientType::Tool))
            .collect();
        deps.insert(buckets::TOOLS, Bucket::List(tools));

        Ok(deps)
    }
}

fn list_bucket(key: &str, items: Vec<Ingredient>) -> BucketMap {
    let mut map = BucketMap::new();
    map.insert(key, Bucket::List(items));
    map
}

/// Extractor for `Pipfile.lock`: JSON with `default` and `develop` sections.
pub struct PipfileLockExtractor;

impl PipfileLockExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for PipfileLockExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        let mut deps = BucketMap::new();

        for (section, bucket) in [("default", buckets::NECESSARY), ("develop", buckets::DEV)] {
            let mut seen = HashSet::new();
            if let Some(pkgs) = json.get(section).and_then(|v| v.as_object()) {
                let items: Vec<_> = pkgs
                    .keys()
                    .filter(|name| seen.insert(name.to_lowercase()))
                    .map(|name| classify(name))
                    .collect();
                deps.insert(bucket, Bucket::List(items));
            }
        }

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
    fn test_requirements_skips_paths_urls_and_flags() {
        let text = "\
# comment
requests==2.28.1
flask>=2.0.0
zope.interface>=5
numpy==1.24.0 ; python_version >= '3.8'
-r dev-requirements.txt
--index-url https://pypi.example.org/simple
-e git+https://github.com/org/pkg.git#egg=pkg
https://example.com/pkg-1.0.tar.gz
./vendor/local_pkg
wheels/pkg-1.0-py3-none-any.whl
requests[security]>=2.0
";
        let deps = RequirementsExtractor::new().extract(text).unwrap();
        assert_eq!(
            names(&deps, buckets::NECESSARY),
            vec!["requests", "flask", "zope.interface", "numpy", "requests"]
        );
    }

    #[test]
    fn test_requirements_mismatch_is_not_fatal() {
        let deps = RequirementsExtractor::new()
            .extract("==1.0\n[extras]\nrich\n")
            .unwrap();
        assert_eq!(names(&deps, buckets::NECESSARY), vec!["rich"]);
    }

    #[test]
    fn test_pyproject_dependencies_and_classifiers() {
        let text = r#"
[project]
name = "demo"
dependencies = ["Django>=4.2", "requests"]
classifiers = [
    "Framework :: Django",
    "Programming Language :: Python :: 3",
]

[project.optional-dependencies]
docs = ["sphinx"]
test = ["pytest>=7", "coverage[toml]"]

[tool.black]
line-length = 100

[tool.ruff]
select = ["E"]
"#;
        let deps = PyProjectExtractor::new().extract(text).unwrap();

        match deps.get(buckets::NECESSARY) {
            Some(Bucket::List(items)) => {
                assert_eq!(items[0].name, "Django");
                assert_eq!(items[0].kind, IngredientType::Framework);
                assert_eq!(items[1].kind, IngredientType::Library);
            }
            other => panic!("unexpected {:?}", other),
        }
        match deps.get(buckets::OPTIONAL) {
            Some(Bucket::Groups(groups)) => {
                assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["docs", "test"]);
                assert_eq!(groups["test"][1].name, "coverage");
            }
            other => panic!("unexpected {:?}", other),
        }
        let tools = deps.get(buckets::TOOLS).unwrap();
        match tools {
            Bucket::List(items) => {
                assert_eq!(items.len(), 2);
                assert!(items.iter().all(|i| i.kind == IngredientType::Tool));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pyproject_optional_list_goes_to_ungrouped() {
        let text = r#"
[project]
name = "demo"
optional-dependencies = ["colorama"]
"#;
        let deps = PyProjectExtractor::new().extract(text).unwrap();
        match deps.get(buckets::OPTIONAL) {
            Some(Bucket::Groups(groups)) => {
                assert_eq!(groups[buckets::UNGROUPED][0].name, "colorama");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pyproject_poetry_tables() {
        let text = r#"
[tool.poetry.dependencies]
python = "^3.11"
httpx = "^0.27"

[tool.poetry.dev-dependencies]
mypy = "*"

[tool.poetry.group.docs.dependencies]
mkdocs = "*"
"#;
        let deps = PyProjectExtractor::new().extract(text).unwrap();
        assert_eq!(names(&deps, buckets::NECESSARY), vec!["httpx"]);
        assert_eq!(names(&deps, buckets::DEV), vec!["mypy"]);
        match deps.get(buckets::GROUPS) {
            Some(Bucket::Groups(groups)) => assert_eq!(groups["docs"][0].name, "mkdocs"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(names(&deps, buckets::TOOLS), vec!["poetry"]);
    }

    #[test]
    fn test_pyproject_invalid_toml_fails() {
        assert!(PyProjectExtractor::new().extract("[project").is_err());
    }

    #[test]
    fn test_pipfile_lock() {
        let text = r#"{
  "_meta": {"hash": {"sha256": "x"}},
  "default": {"requests": {"version": "==2.31.0"}},
  "develop": {"pytest": {"version": "==8.0.0"}}
}"#;
        let deps = PipfileLockExtractor::new().extract(text).unwrap();
        assert_eq!(names(&deps, buckets::NECESSARY), vec!["requests"]);
        assert_eq!(names(&deps, buckets::DEV), vec!["pytest"]);
    }
}
