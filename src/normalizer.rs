//! Builds the canonical [`RepositoryRecord`] from a raw snapshot.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};

use crate::models::{
    BucketMap, EntryKind, FileEntry, FileTree, RepositorySnapshot, RepositoryRecord, TreeEntry,
};

/// Key holding the files at the top of the repository.
pub const ROOT_KEY: &str = "root";

/// A directory of the rebuilt file hierarchy. Files and sub-directories
/// are kept apart, so a name can be both without clashing.
#[derive(Debug, Default, PartialEq)]
pub struct DirNode {
    pub files: Vec<String>,
    pub dirs: IndexMap<String, DirNode>,
}

impl DirNode {
    fn dir_mut<'a, I>(&mut self, segments: I) -> &mut DirNode
    where
        I: IntoIterator<Item = &'a str>,
    {
        segments.into_iter().fold(self, |node, segment| {
            node.dirs.entry(segment.to_string()).or_default()
        })
    }

    fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.values().all(DirNode::is_empty)
    }

    /// Files first, then non-empty sub-directories as single-key maps.
    fn entries(&self) -> Vec<TreeEntry> {
        let mut entries: Vec<TreeEntry> =
            self.files.iter().cloned().map(TreeEntry::File).collect();
        for (name, dir) in &self.dirs {
            if !dir.is_empty() {
                entries.push(TreeEntry::Dir(IndexMap::from([(
                    name.clone(),
                    dir.entries(),
                )])));
            }
        }
        entries
    }
}

/// Rebuild the directory hierarchy from a flat path listing.
///
/// Intermediate segments become directories; a `blob` leaf is a file and a
/// `tree` leaf a (possibly empty) directory.
pub fn build_hierarchy(entries: &[FileEntry]) -> DirNode {
    let mut root = DirNode::default();

    for entry in entries {
        let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };
        let parent = root.dir_mut(parents.iter().copied());
        match entry.kind {
            EntryKind::Blob => {
                if !parent.files.iter().any(|f| f == last) {
                    parent.files.push(last.to_string());
                }
            }
            EntryKind::Tree => {
                parent.dir_mut([*last]);
            }
        }
    }

    root
}

/// Flatten a hierarchy into the `{dir: [files..., {subdir: [...]}]}` listing.
/// Top-level files go under [`ROOT_KEY`]; empty directories are dropped. A
/// top-level directory that is itself named `root` merges into that entry.
pub fn flatten(root: &DirNode) -> FileTree {
    let mut tree = FileTree::new();
    if !root.files.is_empty() {
        tree.insert(
            ROOT_KEY.to_string(),
            root.files.iter().cloned().map(TreeEntry::File).collect(),
        );
    }
    for (name, dir) in &root.dirs {
        if !dir.is_empty() {
            tree.entry(name.clone()).or_default().extend(dir.entries());
        }
    }
    tree
}

/// Language names become identifiers: spaces turn into underscores.
pub fn normalize_language(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Assemble the canonical record for `snapshot` around its merged
/// `dependencies`.
pub fn normalize(snapshot: &RepositorySnapshot, dependencies: BucketMap) -> RepositoryRecord {
    let languages: Vec<String> = snapshot
        .languages
        .keys()
        .map(|lang| normalize_language(lang))
        .collect();

    let ingredients = dependencies.ingredients();
    let mut ingredient_types: BTreeSet<String> =
        ingredients.iter().map(|i| i.kind.to_string()).collect();
    if !languages.is_empty() {
        ingredient_types.insert("Language".to_string());
    }

    let tasks: IndexSet<&String> = ingredients
        .iter()
        .flat_map(|i| i.associated_tasks.iter())
        .collect();
    let ingredient_count = ingredients.len() + languages.len();
    let tasks = tasks.into_iter().cloned().collect();

    RepositoryRecord {
        name: snapshot.name.clone(),
        description: snapshot.description.clone().unwrap_or_default(),
        languages,
        readme: snapshot.readme.clone().unwrap_or_default(),
        files: flatten(&build_hierarchy(&snapshot.files)),
        submodules: snapshot.submodules.clone(),
        dependencies,
        tasks,
        ingredient_types,
        ingredient_count,
    }
}
