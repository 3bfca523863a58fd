//! Folds every manifest of a repository into one bucket map.

use crate::analyzer::{buckets, dotnet, go, java, node, php, python, ruby, rust};
use crate::analyzer::{Extractor, ManifestKind};
use crate::classifier::classify;
use crate::classifier::tfm::FrameworkTable;
use crate::config::Config;
use crate::models::{Bucket, BucketMap, RepositorySnapshot};
use crate::normalizer::normalize_language;

/// Repository languages that are .NET languages per the configuration,
/// in normalized form.
pub fn dotnet_languages(snapshot: &RepositorySnapshot, config: &Config) -> Vec<String> {
    snapshot
        .languages
        .keys()
        .filter(|lang| {
            config
                .dotnet
                .languages
                .iter()
                .any(|known| known.eq_ignore_ascii_case(lang))
        })
        .map(|lang| normalize_language(lang))
        .collect()
}

/// Run the extractor for every manifest of the snapshot and fold the results.
///
/// Kinds listed in `exclude` are skipped. A manifest that fails to parse is
/// logged and skipped; the rest of the repository is still processed.
pub fn aggregate(
    snapshot: &RepositorySnapshot,
    config: &Config,
    exclude: &[ManifestKind],
) -> BucketMap {
    let table = FrameworkTable::new(&config.dotnet.frameworks);
    let languages = dotnet_languages(snapshot, config);
    let mut deps = BucketMap::new();

    for kind in ManifestKind::ALL {
        if exclude.contains(&kind) {
            continue;
        }
        let files = manifest_files(snapshot, kind);
        if files.is_empty() {
            continue;
        }

        let extractor: Box<dyn Extractor + '_> = match kind {
            ManifestKind::PyProject => Box::new(python::PyProjectExtractor::new()),
            ManifestKind::Requirements => Box::new(python::RequirementsExtractor::new()),
            ManifestKind::PipfileLock => Box::new(python::PipfileLockExtractor::new()),
            ManifestKind::PackageJson => Box::new(node::PackageJsonExtractor::new()),
            ManifestKind::PackageLock => Box::new(node::PackageLockExtractor::new()),
            ManifestKind::YarnLock => Box::new(node::YarnLockExtractor::new()),
            ManifestKind::Pom => Box::new(java::PomExtractor::new()),
            ManifestKind::Gradle => Box::new(java::GradleExtractor::new()),
            ManifestKind::Gemfile => Box::new(ruby::GemfileExtractor::new()),
            ManifestKind::Composer => Box::new(php::ComposerExtractor::new()),
            ManifestKind::GoMod => Box::new(go::GoModExtractor::new()),
            ManifestKind::GoSum => Box::new(go::GoSumExtractor::new()),
            ManifestKind::CargoToml => Box::new(rust::CargoTomlExtractor::new()),
            ManifestKind::CargoLock => Box::new(rust::CargoLockExtractor::new()),
            ManifestKind::CsProj | ManifestKind::VbProj | ManifestKind::FsProj => {
                Box::new(dotnet::ProjectFileExtractor::new(&table, &languages))
            }
            ManifestKind::PackagesConfig => {
                Box::new(dotnet::PackagesConfigExtractor::new(&table, &languages))
            }
        };

        for (path, text) in files {
            match extractor.extract(text) {
                Ok(found) => {
                    tracing::debug!(
                        "{}: {} ingredients from {}",
                        kind,
                        found.ingredients().len(),
                        path
                    );
                    if let Err(e) = deps.merge(found) {
                        tracing::warn!("{}: {}: {}", kind, path, e);
                    }
                }
                Err(e) => tracing::warn!("{}: failed to parse {}: {:#}", kind, path, e),
            }
        }
    }

    let submodules: Vec<_> = snapshot.submodules.iter().map(|s| classify(s)).collect();
    deps.insert(buckets::SUBMODULES, Bucket::List(submodules));

    tag_tasks(&mut deps, config);
    deps
}

/// Manifests of `kind` with non-empty text, as `(path, text)`.
fn manifest_files(snapshot: &RepositorySnapshot, kind: ManifestKind) -> Vec<(&str, &str)> {
    snapshot
        .manifests
        .iter()
        .filter(|(key, _)| ManifestKind::from_key(key) == Some(kind))
        .flat_map(|(_, files)| files.iter())
        .filter_map(|file| match file.text.as_deref() {
            Some(text) if !text.trim().is_empty() => Some((file.path.as_str(), text)),
            _ => {
                tracing::debug!("{}: {} has no content", kind, file.path);
                None
            }
        })
        .collect()
}

/// Add the configured task to every ingredient of the matching bucket.
/// Keys are a bucket (`devDependencies`) or a bucket group (`groups.test`).
fn tag_tasks(deps: &mut BucketMap, config: &Config) {
    for (key, task) in &config.tasks.0 {
        match key.split_once('.') {
            None => deps.for_each_in(key, |ingredient| {
                ingredient.associated_tasks.insert(task.clone());
            }),
            Some((bucket, group)) => {
                if let Some(Bucket::Groups(groups)) = deps.get_mut(bucket) {
                    if let Some(items) = groups.get_mut(group) {
                        for ingredient in items {
                            ingredient.associated_tasks.insert(task.clone());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IngredientType, ManifestFile};

    fn snapshot(manifests: &[(&str, &str, Option<&str>)]) -> RepositorySnapshot {
        let mut snapshot = RepositorySnapshot {
            name: "Foo".to_string(),
            ..Default::default()
        };
        for (key, path, text) in manifests {
            snapshot
                .manifests
                .entry(key.to_string())
                .or_default()
                .push(ManifestFile {
                    path: path.to_string(),
                    text: text.map(String::from),
                });
        }
        snapshot
    }

    fn names(deps: &BucketMap, key: &str) -> Vec<String> {
        match deps.get(key) {
            Some(Bucket::List(items)) => items.iter().map(|i| i.name.clone()).collect(),
            other => panic!("expected list bucket '{}', got {:?}", key, other),
        }
    }

    #[test]
    fn test_lists_concatenate_across_files() {
        let snap = snapshot(&[
            ("requirements.txt", "requirements.txt", Some("numpy\n")),
            ("requirements.txt", "docs/requirements.txt", Some("numpy\nsphinx\n")),
        ]);
        let deps = aggregate(&snap, &Config::default(), &[]);
        assert_eq!(names(&deps, buckets::NECESSARY), vec!["numpy", "numpy", "sphinx"]);
    }

    #[test]
    fn test_broken_manifest_does_not_stop_others() {
        let snap = snapshot(&[
            ("package.json", "package.json", Some("{ broken")),
            ("requirements.txt", "requirements.txt", Some("flask\n")),
            ("Cargo.toml", "Cargo.toml", None),
        ]);
        let deps = aggregate(&snap, &Config::default(), &[]);
        assert_eq!(names(&deps, buckets::NECESSARY), vec!["flask"]);
    }

    #[test]
    fn test_excluded_kinds_are_skipped() {
        let snap = snapshot(&[
            ("requirements.txt", "requirements.txt", Some("flask\n")),
            ("Gemfile", "Gemfile", Some("gem 'rails'\n")),
        ]);
        let deps = aggregate(&snap, &Config::default(), &[ManifestKind::Requirements]);
        assert_eq!(names(&deps, buckets::NECESSARY), vec!["rails"]);
    }

    #[test]
    fn test_tasks_are_tagged_from_config() {
        let snap = snapshot(&[
            (
                "package.json",
                "package.json",
                Some(r#"{"dependencies": {"express": "*"}, "devDependencies": {"jest": "*"}}"#),
            ),
            (
                "Gemfile",
                "Gemfile",
                Some("group :test do\n  gem 'rspec'\nend\n"),
            ),
        ]);
        let deps = aggregate(&snap, &Config::default(), &[]);
        let all = deps.ingredients();
        let find = |name: &str| all.iter().find(|i| i.name == name).unwrap();
        assert!(find("express").associated_tasks.is_empty());
        assert!(find("jest").associated_tasks.contains("development"));
        assert!(find("rspec").associated_tasks.contains("testing"));
    }

    #[test]
    fn test_dotnet_frameworks_carry_repository_languages() {
        let mut snap = snapshot(&[(
            ".csproj",
            "App/App.csproj",
            Some(r#"<Project><PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup></Project>"#),
        )]);
        snap.languages.insert("C#".to_string(), 5000);
        snap.languages.insert("Visual Basic .NET".to_string(), 100);
        snap.languages.insert("PowerShell".to_string(), 20);

        let deps = aggregate(&snap, &Config::default(), &[]);
        match deps.get(buckets::FRAMEWORKS) {
            Some(Bucket::List(items)) => {
                assert_eq!(items[0].kind, IngredientType::Framework);
                let langs: Vec<_> = items[0].associated_languages.iter().cloned().collect();
                assert_eq!(langs, vec!["C#", "Visual_Basic_.NET"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_submodules_become_ingredients() {
        let mut snap = snapshot(&[]);
        snap.submodules = vec!["third_party/googletest".to_string(), " ".to_string()];
        let deps = aggregate(&snap, &Config::default(), &[]);
        assert_eq!(names(&deps, buckets::SUBMODULES), vec!["third_party/googletest"]);
    }
}
