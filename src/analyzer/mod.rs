//! Per-ecosystem manifest extractors.
//!
//! Every extractor turns the text of one manifest into a [`BucketMap`] keyed
//! by the bucket names in [`buckets`]. Entries that match no expected pattern
//! are logged with `tracing::warn!` and skipped; a manifest that is not valid
//! TOML/JSON/XML fails as a whole.

use anyhow::Result;

use crate::models::BucketMap;

pub mod dotnet;
pub mod go;
pub mod java;
pub mod node;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust;

/// Bucket keys shared across ecosystems.
pub mod buckets {
    pub const NECESSARY: &str = "necessary";
    pub const DEV: &str = "devDependencies";
    pub const PEER: &str = "peerDependencies";
    pub const BUNDLED: &str = "bundledDependencies";
    pub const BUILD: &str = "buildDependencies";
    pub const WORKSPACE: &str = "workspaceDependencies";
    pub const INDIRECT: &str = "indirect";
    pub const OPTIONAL: &str = "optional";
    pub const GROUPS: &str = "groups";
    pub const TARGET: &str = "target";
    pub const TOOLS: &str = "tools";
    pub const OS: &str = "os";
    pub const PLUGINS: &str = "plugins";
    pub const REFERENCES: &str = "references";
    pub const FRAMEWORKS: &str = "frameworks";
    pub const LOCKFILE: &str = "lockfile";
    pub const SUBMODULES: &str = "submodules";

    /// Group used when optional dependencies come as a bare list.
    pub const UNGROUPED: &str = "ungrouped";
}

/// Parses the text of a single manifest file.
pub trait Extractor {
    fn extract(&self, text: &str) -> Result<BucketMap>;
}

/// Manifest types recognised in a repository, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    PyProject,
    Requirements,
    PipfileLock,
    PackageJson,
    PackageLock,
    YarnLock,
    Pom,
    Gradle,
    Gemfile,
    Composer,
    GoMod,
    GoSum,
    CargoToml,
    CargoLock,
    CsProj,
    VbProj,
    FsProj,
    PackagesConfig,
}

impl ManifestKind {
    pub const ALL: [ManifestKind; 18] = [
        ManifestKind::PyProject,
        ManifestKind::Requirements,
        ManifestKind::PipfileLock,
        ManifestKind::PackageJson,
        ManifestKind::PackageLock,
        ManifestKind::YarnLock,
        ManifestKind::Pom,
        ManifestKind::Gradle,
        ManifestKind::Gemfile,
        ManifestKind::Composer,
        ManifestKind::GoMod,
        ManifestKind::GoSum,
        ManifestKind::CargoToml,
        ManifestKind::CargoLock,
        ManifestKind::CsProj,
        ManifestKind::VbProj,
        ManifestKind::FsProj,
        ManifestKind::PackagesConfig,
    ];

    /// Manifest-type key used in repository snapshots.
    pub fn key(self) -> &'static str {
        match self {
            ManifestKind::PyProject => "pyproject.toml",
            ManifestKind::Requirements => "requirements.txt",
            ManifestKind::PipfileLock => "Pipfile.lock",
            ManifestKind::PackageJson => "package.json",
            ManifestKind::PackageLock => "package-lock.json",
            ManifestKind::YarnLock => "yarn.lock",
            ManifestKind::Pom => "pom.xml",
            ManifestKind::Gradle => "build.gradle",
            ManifestKind::Gemfile => "Gemfile",
            ManifestKind::Composer => "composer.json",
            ManifestKind::GoMod => "go.mod",
            ManifestKind::GoSum => "go.sum",
            ManifestKind::CargoToml => "Cargo.toml",
            ManifestKind::CargoLock => "Cargo.lock",
            ManifestKind::CsProj => ".csproj",
            ManifestKind::VbProj => ".vbproj",
            ManifestKind::FsProj => ".fsproj",
            ManifestKind::PackagesConfig => "packages.config",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        if key == "build.gradle.kts" {
            return Some(ManifestKind::Gradle);
        }
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Kind of the file at `path`, judged by its file name.
    pub fn for_path(path: &str) -> Option<Self> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        match file_name {
            "build.gradle.kts" => return Some(ManifestKind::Gradle),
            name if name.ends_with("requirements.txt") => {
                return Some(ManifestKind::Requirements)
            }
            _ => {}
        }
        Self::ALL.into_iter().find(|kind| {
            let key = kind.key();
            if key.starts_with('.') {
                file_name.len() > key.len() && file_name.ends_with(key)
            } else {
                file_name == key
            }
        })
    }
}

impl std::fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
