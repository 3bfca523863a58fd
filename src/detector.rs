use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::analyzer::ManifestKind;
use crate::config::Config;
use crate::models::{EntryKind, FileEntry, ManifestFile, RepositorySnapshot};

/// File extension to the language it is written in.
const EXTENSIONS: &[(&str, &str)] = &[
    ("rs", "Rust"),
    ("py", "Python"),
    ("ipynb", "Jupyter Notebook"),
    ("js", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    ("jsx", "JavaScript"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("kts", "Kotlin"),
    ("scala", "Scala"),
    ("groovy", "Groovy"),
    ("rb", "Ruby"),
    ("php", "PHP"),
    ("go", "Go"),
    ("c", "C"),
    ("h", "C"),
    ("cc", "C++"),
    ("cpp", "C++"),
    ("cxx", "C++"),
    ("hpp", "C++"),
    ("cs", "C#"),
    ("fs", "F#"),
    ("fsx", "F#"),
    ("vb", "Visual Basic .NET"),
    ("swift", "Swift"),
    ("m", "Objective-C"),
    ("sh", "Shell"),
    ("bash", "Shell"),
    ("ps1", "PowerShell"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("vue", "Vue"),
    ("dart", "Dart"),
    ("lua", "Lua"),
    ("r", "R"),
    ("pl", "Perl"),
    ("hs", "Haskell"),
    ("ex", "Elixir"),
    ("exs", "Elixir"),
    ("erl", "Erlang"),
    ("clj", "Clojure"),
    ("ml", "OCaml"),
    ("v", "Coq"),
];

fn language_of(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

/// Load repository snapshots from a JSON file holding one object or an array.
pub fn load_snapshots(path: &Path) -> Result<Vec<RepositorySnapshot>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;

    let snapshots = if value.is_array() {
        serde_json::from_value::<Vec<RepositorySnapshot>>(value)
    } else {
        serde_json::from_value::<RepositorySnapshot>(value).map(|s| vec![s])
    }
    .with_context(|| format!("invalid repository snapshot in {}", path.display()))?;

    Ok(snapshots)
}

/// Build a snapshot of the local repository at `root`.
pub fn scan_directory(root: &Path, config: &Config) -> Result<RepositorySnapshot> {
    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repository")
        .to_string();

    let mut snapshot = RepositorySnapshot {
        name,
        ..Default::default()
    };
    let mut language_bytes: IndexMap<String, u64> = IndexMap::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && e
                    .file_name()
                    .to_str()
                    .is_some_and(|n| config.scan.ignore.iter().any(|i| i == n)))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            snapshot.files.push(FileEntry {
                path,
                kind: EntryKind::Tree,
            });
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(lang) = language_of(entry.path()) {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            *language_bytes.entry(lang.to_string()).or_insert(0) += size;
        }

        if let Some(kind) = ManifestKind::for_path(&path) {
            let text = match fs::read_to_string(entry.path()) {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!("failed to read {}: {}", path, e);
                    None
                }
            };
            tracing::debug!("found {} manifest at {}", kind, path);
            snapshot
                .manifests
                .entry(kind.key().to_string())
                .or_default()
                .push(ManifestFile {
                    path: path.clone(),
                    text,
                });
        }

        if entry.depth() == 1 {
            let file_name = entry.file_name().to_string_lossy();
            let is_readme =
                file_name.to_ascii_uppercase().starts_with("README") && snapshot.readme.is_none();
            if is_readme || file_name == ".gitmodules" {
                match fs::read_to_string(entry.path()) {
                    Ok(text) if is_readme => snapshot.readme = Some(text),
                    Ok(text) => snapshot.submodules = submodule_paths(&text),
                    Err(e) => tracing::warn!("failed to read {}: {}", path, e),
                }
            }
        }

        snapshot.files.push(FileEntry {
            path,
            kind: EntryKind::Blob,
        });
    }

    language_bytes.sort_by(|_, a, _, b| b.cmp(a));
    snapshot.languages = language_bytes;

    tracing::info!(
        "scanned {}: {} entries, {} manifest kinds",
        root.display(),
        snapshot.files.len(),
        snapshot.manifests.len()
    );
    Ok(snapshot)
}

/// `path = ...` entries of a `.gitmodules` file.
fn submodule_paths(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once('=')?;
            let value = value.trim();
            (key.trim() == "path" && !value.is_empty()).then(|| value.to_string())
        })
        .collect()
}
