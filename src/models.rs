use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::BucketError;

/// Coarse ontology type of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IngredientType {
    Library,
    Framework,
    Tool,
    Resource,
}

impl IngredientType {
    /// Parse a classifier category (`"Framework"`, `"tool"`, ...) into a type.
    ///
    /// Categories that are not ingredient types (`"Programming Language"`,
    /// `"License"`, `"Topic"`) yield `None`.
    pub fn from_category(category: &str) -> Option<Self> {
        match category.trim().to_ascii_lowercase().as_str() {
            "library" => Some(IngredientType::Library),
            "framework" => Some(IngredientType::Framework),
            "tool" => Some(IngredientType::Tool),
            "resource" => Some(IngredientType::Resource),
            _ => None,
        }
    }
}

impl std::fmt::Display for IngredientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngredientType::Library => write!(f, "Library"),
            IngredientType::Framework => write!(f, "Framework"),
            IngredientType::Tool => write!(f, "Tool"),
            IngredientType::Resource => write!(f, "Resource"),
        }
    }
}

/// A classified dependency, tool or resource taken from a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: IngredientType,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub associated_languages: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub associated_tasks: BTreeSet<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, kind: IngredientType) -> Self {
        Self {
            name: name.into(),
            kind,
            associated_languages: BTreeSet::new(),
            associated_tasks: BTreeSet::new(),
        }
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associated_languages
            .extend(languages.into_iter().map(Into::into));
        self
    }

    pub fn with_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associated_tasks.extend(tasks.into_iter().map(Into::into));
        self
    }
}

/// A named grouping of ingredients inside one manifest.
///
/// The variant fixes the structural shape; buckets only merge with buckets
/// of the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bucket {
    /// `necessary`, `devDependencies`, `lockfile`, ...
    List(Vec<Ingredient>),
    /// `optional` and `groups`: group name to ingredients.
    Groups(IndexMap<String, Vec<Ingredient>>),
    /// `target`: platform-scoped nested bucket maps.
    Targets(IndexMap<String, BucketMap>),
}

impl Bucket {
    fn shape(&self) -> &'static str {
        match self {
            Bucket::List(_) => "list",
            Bucket::Groups(_) => "groups",
            Bucket::Targets(_) => "targets",
        }
    }

    /// Fold `other` into `self`: lists concatenate, groups merge key by key,
    /// targets merge recursively.
    pub fn merge(&mut self, key: &str, other: Bucket) -> Result<(), BucketError> {
        match (self, other) {
            (Bucket::List(items), Bucket::List(more)) => {
                items.extend(more);
                Ok(())
            }
            (Bucket::Groups(groups), Bucket::Groups(more)) => {
                for (group, items) in more {
                    groups.entry(group).or_default().extend(items);
                }
                Ok(())
            }
            (Bucket::Targets(targets), Bucket::Targets(more)) => {
                for (target, nested) in more {
                    targets.entry(target).or_default().merge(nested)?;
                }
                Ok(())
            }
            (current, other) => Err(BucketError::ShapeMismatch {
                key: key.to_string(),
                existing: current.shape(),
                incoming: other.shape(),
            }),
        }
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Ingredient>) {
        match self {
            Bucket::List(items) => out.extend(items.iter()),
            Bucket::Groups(groups) => {
                for items in groups.values() {
                    out.extend(items.iter());
                }
            }
            Bucket::Targets(targets) => {
                for nested in targets.values() {
                    nested.collect(out);
                }
            }
        }
    }

    fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Ingredient)) {
        match self {
            Bucket::List(items) => items.iter_mut().for_each(|i| f(i)),
            Bucket::Groups(groups) => {
                for items in groups.values_mut() {
                    items.iter_mut().for_each(|i| f(i));
                }
            }
            Bucket::Targets(targets) => {
                for nested in targets.values_mut() {
                    nested.for_each_mut(f);
                }
            }
        }
    }
}

/// Ordered map from bucket key to bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketMap(pub IndexMap<String, Bucket>);

impl BucketMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Bucket> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Bucket> {
        self.0.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Bucket)> {
        self.0.iter()
    }

    /// Append to a list bucket, creating it when absent.
    ///
    /// Ingredients with a blank name are logged and dropped.
    pub fn push(&mut self, key: &str, ingredient: Ingredient) {
        if !has_name(&ingredient, key) {
            return;
        }
        if let Bucket::List(items) = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| Bucket::List(Vec::new()))
        {
            items.push(ingredient);
        }
    }

    /// Insert a bucket, skipping empty lists and empty group maps.
    ///
    /// Ingredients with a blank name are logged and dropped first.
    pub fn insert(&mut self, key: &str, bucket: Bucket) {
        let bucket = match bucket {
            Bucket::List(items) => Bucket::List(named(items, key)),
            Bucket::Groups(groups) => Bucket::Groups(
                groups
                    .into_iter()
                    .map(|(group, items)| (group, named(items, key)))
                    .collect(),
            ),
            targets => targets,
        };
        let empty = match &bucket {
            Bucket::List(items) => items.is_empty(),
            Bucket::Groups(groups) => groups.is_empty(),
            Bucket::Targets(targets) => targets.is_empty(),
        };
        if !empty {
            self.0.insert(key.to_string(), bucket);
        }
    }

    /// Merge every bucket of `other` into `self`.
    ///
    /// A bucket whose shape differs from the existing one is dropped; the
    /// other buckets still merge and the first mismatch is returned.
    pub fn merge(&mut self, other: BucketMap) -> Result<(), BucketError> {
        let mut first_error = None;
        for (key, bucket) in other.0 {
            let result = match self.0.get_mut(&key) {
                Some(existing) => existing.merge(&key, bucket),
                None => {
                    self.0.insert(key, bucket);
                    Ok(())
                }
            };
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// All ingredients in bucket traversal order (buckets, then groups or
    /// targets, then nested buckets).
    pub fn ingredients(&self) -> Vec<&Ingredient> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Ingredient>) {
        for bucket in self.0.values() {
            bucket.collect(out);
        }
    }

    /// Apply `f` to every ingredient of the bucket stored under `key`.
    pub fn for_each_in(&mut self, key: &str, mut f: impl FnMut(&mut Ingredient)) {
        if let Some(bucket) = self.0.get_mut(key) {
            bucket.for_each_mut(&mut f);
        }
    }

    fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Ingredient)) {
        for bucket in self.0.values_mut() {
            bucket.for_each_mut(f);
        }
    }
}

fn has_name(ingredient: &Ingredient, key: &str) -> bool {
    let named = !ingredient.name.trim().is_empty();
    if !named {
        tracing::warn!("{}: dropping {} with an empty name", key, ingredient.kind);
    }
    named
}

fn named(items: Vec<Ingredient>, key: &str) -> Vec<Ingredient> {
    items.into_iter().filter(|i| has_name(i, key)).collect()
}

/// Kind of an entry in the repository file listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// One manifest file found in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Raw repository data as supplied by the retrieval side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
    /// Language name to byte count, in the order reported.
    #[serde(default)]
    pub languages: IndexMap<String, u64>,
    #[serde(default, rename = "file_path_data", alias = "files")]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub submodules: Vec<String>,
    /// Manifest-type key (`"Cargo.toml"`, `".csproj"`) to the files of that type.
    #[serde(default, rename = "dependency_file_data", alias = "manifests")]
    pub manifests: IndexMap<String, Vec<ManifestFile>>,
}

/// An entry of a flattened directory listing: a file name or a sub-directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeEntry {
    File(String),
    Dir(IndexMap<String, Vec<TreeEntry>>),
}

/// Flattened directory listing; top-level files live under `root`.
pub type FileTree = IndexMap<String, Vec<TreeEntry>>;

/// Canonical repository record consumed by the ontology emitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub description: String,
    pub languages: Vec<String>,
    pub readme: String,
    pub files: FileTree,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submodules: Vec<String>,
    pub dependencies: BucketMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<String>,
    pub ingredient_types: BTreeSet<String>,
    pub ingredient_count: usize,
}
