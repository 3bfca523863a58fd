use std::path::PathBuf;

use clap::Parser;

use cocktail::analyzer::ManifestKind;

#[derive(Parser, Debug)]
#[command(
    name = "cocktail",
    about = "Describe a repository's dependencies as a cocktail ontology",
    version
)]
pub struct Cli {
    /// Repository directory to scan, or a JSON repository snapshot file
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Config file [default: ./.cocktail/config.toml, fallback ~/.config/cocktail/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the rendered output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Skip a manifest type (repeatable)
    #[arg(long = "exclude-manifest", value_name = "KIND")]
    pub exclude_manifest: Vec<ManifestArg>,

    /// Show every ingredient and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Terminal,
    /// Full cocktail ontology text
    Ontology,
    /// Cocktail Identity Card text
    Cic,
    /// Graphviz digraph of the identity card
    Dot,
    Json,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ManifestArg {
    Pyproject,
    Requirements,
    Pipfile,
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
    Csproj,
    Vbproj,
    Fsproj,
    PackagesConfig,
}

impl From<&ManifestArg> for ManifestKind {
    fn from(arg: &ManifestArg) -> Self {
        match arg {
            ManifestArg::Pyproject => ManifestKind::PyProject,
            ManifestArg::Requirements => ManifestKind::Requirements,
            ManifestArg::Pipfile => ManifestKind::PipfileLock,
            ManifestArg::PackageJson => ManifestKind::PackageJson,
            ManifestArg::PackageLock => ManifestKind::PackageLock,
            ManifestArg::YarnLock => ManifestKind::YarnLock,
            ManifestArg::Pom => ManifestKind::Pom,
            ManifestArg::Gradle => ManifestKind::Gradle,
            ManifestArg::Gemfile => ManifestKind::Gemfile,
            ManifestArg::Composer => ManifestKind::Composer,
            ManifestArg::GoMod => ManifestKind::GoMod,
            ManifestArg::GoSum => ManifestKind::GoSum,
            ManifestArg::CargoToml => ManifestKind::CargoToml,
            ManifestArg::CargoLock => ManifestKind::CargoLock,
            ManifestArg::Csproj => ManifestKind::CsProj,
            ManifestArg::Vbproj => ManifestKind::VbProj,
            ManifestArg::Fsproj => ManifestKind::FsProj,
            ManifestArg::PackagesConfig => ManifestKind::PackagesConfig,
        }
    }
}
