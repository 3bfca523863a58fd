use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::models::{Ingredient, IngredientType};

/// Built-in framework family to target framework moniker table.
///
/// A family name containing `/` denotes monikers shared by several
/// frameworks; each half becomes its own Framework ingredient.
const DEFAULT_FRAMEWORKS: &[(&str, &[&str])] = &[
    (
        ".NET",
        &["net5.0", "net6.0", "net7.0", "net8.0", "net9.0", "net10.0"],
    ),
    (
        ".NET Core",
        &[
            "netcoreapp1.0",
            "netcoreapp1.1",
            "netcoreapp2.0",
            "netcoreapp2.1",
            "netcoreapp2.2",
            "netcoreapp3.0",
            "netcoreapp3.1",
        ],
    ),
    (
        ".NET Standard",
        &[
            "netstandard1.0",
            "netstandard1.1",
            "netstandard1.2",
            "netstandard1.3",
            "netstandard1.4",
            "netstandard1.5",
            "netstandard1.6",
            "netstandard2.0",
            "netstandard2.1",
        ],
    ),
    (
        ".NET Framework",
        &[
            "net11", "net20", "net35", "net40", "net403", "net45", "net451", "net452", "net46",
            "net461", "net462", "net47", "net471", "net472", "net48", "net481",
        ],
    ),
    ("Windows Store", &["netcore45", "netcore451", "win8", "win81"]),
    (".NET nanoFramework", &["netnano1.0"]),
    ("Universal Windows Platform", &["uap", "uap10.0"]),
    ("Windows Phone/Silverlight", &["wp", "wp7", "wp75"]),
    ("Windows Phone", &["wp8", "wp81", "wpa81"]),
    ("Silverlight", &["sl4", "sl5"]),
    ("Xamarin.Android", &["monoandroid"]),
    ("Xamarin.iOS", &["xamarinios", "monotouch"]),
    ("Xamarin.Mac", &["xamarinmac"]),
];

/// The built-in table in configuration form (family to monikers).
pub fn default_frameworks() -> IndexMap<String, Vec<String>> {
    DEFAULT_FRAMEWORKS
        .iter()
        .map(|(family, monikers)| {
            (
                family.to_string(),
                monikers.iter().map(|m| m.to_string()).collect(),
            )
        })
        .collect()
}

/// Moniker to framework family lookup, built once per repository and shared
/// by every .NET manifest in it.
#[derive(Debug, Clone)]
pub struct FrameworkTable {
    families: HashMap<String, String>,
}

impl FrameworkTable {
    pub fn new(frameworks: &IndexMap<String, Vec<String>>) -> Self {
        let mut families = HashMap::new();
        for (family, monikers) in frameworks {
            for moniker in monikers {
                families
                    .entry(moniker.to_ascii_lowercase())
                    .or_insert_with(|| family.clone());
            }
        }
        Self { families }
    }

    /// Family for a single moniker: an exact match, or else the longest known
    /// moniker the given one starts with (`net8.0-windows` → `net8.0`).
    pub fn family(&self, moniker: &str) -> Option<&str> {
        let moniker = moniker.trim().to_ascii_lowercase();
        if let Some(family) = self.families.get(&moniker) {
            return Some(family);
        }
        self.families
            .iter()
            .filter(|(known, _)| moniker.starts_with(known.as_str()))
            .max_by_key(|(known, _)| known.len())
            .map(|(_, family)| family.as_str())
    }

    /// Resolve monikers to deduplicated Framework ingredients, in first-seen
    /// order. Every framework is associated with `languages`.
    pub fn resolve<'a, I>(&self, monikers: I, languages: &[String]) -> Vec<Ingredient>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut frameworks = Vec::new();

        for moniker in monikers {
            let Some(family) = self.family(moniker) else {
                tracing::warn!(".NET: unknown target framework moniker: {}", moniker);
                continue;
            };
            if !seen.insert(family) {
                continue;
            }
            for name in family.split('/') {
                let name = name.trim();
                if !name.is_empty() {
                    frameworks.push(
                        Ingredient::new(name, IngredientType::Framework)
                            .with_languages(languages.iter().cloned()),
                    );
                }
            }
        }

        frameworks
    }
}

impl Default for FrameworkTable {
    fn default() -> Self {
        Self::new(&default_frameworks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_prefixed_monikers() {
        let table = FrameworkTable::default();
        assert_eq!(table.family("net8.0"), Some(".NET"));
        assert_eq!(table.family("net8.0-windows10.0.19041"), Some(".NET"));
        assert_eq!(table.family("net451"), Some(".NET Framework"));
        assert_eq!(table.family("netcoreapp3.1"), Some(".NET Core"));
        assert_eq!(table.family("NetStandard2.0"), Some(".NET Standard"));
        assert_eq!(table.family("wpa81"), Some("Windows Phone"));
        assert_eq!(table.family("cobol"), None);
    }

    #[test]
    fn test_resolve_deduplicates_families() {
        let table = FrameworkTable::default();
        let frameworks = table.resolve(["net6.0", "net8.0", "netstandard2.0"], &[]);
        let names: Vec<_> = frameworks.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec![".NET", ".NET Standard"]);
        assert!(frameworks.iter().all(|f| f.kind == IngredientType::Framework));
    }

    #[test]
    fn test_shared_family_splits() {
        let table = FrameworkTable::default();
        let frameworks = table.resolve(["wp7"], &["C#".to_string()]);
        let names: Vec<_> = frameworks.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Windows Phone", "Silverlight"]);
        assert!(frameworks[0].associated_languages.contains("C#"));
    }

    #[test]
    fn test_custom_table() {
        let mut frameworks = IndexMap::new();
        frameworks.insert("Unity".to_string(), vec!["unity2022".to_string()]);
        let table = FrameworkTable::new(&frameworks);
        assert_eq!(table.family("unity2022.3"), Some("Unity"));
        assert_eq!(table.family("net8.0"), None);
    }
}
