//! Duplicate collapsing within buckets.
//!
//! Two ingredients in the same list are duplicates when they agree on every
//! field except the merged one; the merged field of the survivor is the
//! union of theirs. The first occurrence keeps its position.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::models::{Bucket, BucketMap, Ingredient, IngredientType};

/// The set-valued field unioned across duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergedField {
    #[default]
    AssociatedTasks,
    AssociatedLanguages,
}

impl MergedField {
    fn get(self, ingredient: &Ingredient) -> &BTreeSet<String> {
        match self {
            MergedField::AssociatedTasks => &ingredient.associated_tasks,
            MergedField::AssociatedLanguages => &ingredient.associated_languages,
        }
    }

    fn get_mut(self, ingredient: &mut Ingredient) -> &mut BTreeSet<String> {
        match self {
            MergedField::AssociatedTasks => &mut ingredient.associated_tasks,
            MergedField::AssociatedLanguages => &mut ingredient.associated_languages,
        }
    }

    /// The fields that take part in identity, besides name and type.
    fn other<'a>(self, ingredient: &'a Ingredient) -> &'a BTreeSet<String> {
        match self {
            MergedField::AssociatedTasks => &ingredient.associated_languages,
            MergedField::AssociatedLanguages => &ingredient.associated_tasks,
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
struct Identity<'a> {
    name: &'a str,
    kind: IngredientType,
    other: &'a BTreeSet<String>,
}

/// Collapse duplicates in every list of `map`. Groups and targets are
/// handled recursively; the input is left untouched.
pub fn dedup(map: &BucketMap, field: MergedField) -> BucketMap {
    BucketMap(
        map.iter()
            .map(|(key, bucket)| (key.clone(), dedup_bucket(bucket, field)))
            .collect(),
    )
}

fn dedup_bucket(bucket: &Bucket, field: MergedField) -> Bucket {
    match bucket {
        Bucket::List(items) => Bucket::List(dedup_list(items, field)),
        Bucket::Groups(groups) => Bucket::Groups(
            groups
                .iter()
                .map(|(group, items)| (group.clone(), dedup_list(items, field)))
                .collect(),
        ),
        Bucket::Targets(targets) => Bucket::Targets(
            targets
                .iter()
                .map(|(target, nested)| (target.clone(), dedup(nested, field)))
                .collect(),
        ),
    }
}

fn dedup_list(items: &[Ingredient], field: MergedField) -> Vec<Ingredient> {
    let mut merged: IndexMap<Identity<'_>, Ingredient> = IndexMap::new();

    for item in items {
        let identity = Identity {
            name: &item.name,
            kind: item.kind,
            other: field.other(item),
        };
        match merged.get_mut(&identity) {
            Some(existing) => {
                let incoming = field.get(item).iter().cloned();
                field.get_mut(existing).extend(incoming);
            }
            None => {
                merged.insert(identity, item.clone());
            }
        }
    }

    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib(name: &str) -> Ingredient {
        Ingredient::new(name, IngredientType::Library)
    }

    fn list(map: &BucketMap, key: &str) -> Vec<Ingredient> {
        match map.get(key) {
            Some(Bucket::List(items)) => items.clone(),
            other => panic!("expected list bucket '{}', got {:?}", key, other),
        }
    }

    #[test]
    fn test_duplicates_collapse_in_first_seen_order() {
        let mut map = BucketMap::new();
        for name in ["numpy", "pandas", "numpy", "scipy", "pandas"] {
            map.push("necessary", lib(name));
        }
        let deduped = dedup(&map, MergedField::AssociatedTasks);
        let names: Vec<_> = list(&deduped, "necessary")
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["numpy", "pandas", "scipy"]);
    }

    #[test]
    fn test_merged_field_is_unioned() {
        let mut map = BucketMap::new();
        map.push("devDependencies", lib("pytest").with_tasks(["build"]));
        map.push("devDependencies", lib("pytest").with_tasks(["test"]));

        let deduped = dedup(&map, MergedField::AssociatedTasks);
        let items = list(&deduped, "devDependencies");
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].associated_tasks,
            BTreeSet::from(["build".to_string(), "test".to_string()])
        );
    }

    #[test]
    fn test_other_fields_keep_entries_apart() {
        let mut map = BucketMap::new();
        map.push("necessary", lib("Serilog").with_languages(["C#"]));
        map.push("necessary", lib("Serilog").with_languages(["F#"]));
        map.push("necessary", Ingredient::new("Serilog", IngredientType::Tool));

        let by_tasks = dedup(&map, MergedField::AssociatedTasks);
        assert_eq!(list(&by_tasks, "necessary").len(), 3);

        let by_languages = dedup(&map, MergedField::AssociatedLanguages);
        let items = list(&by_languages, "necessary");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].associated_languages.len(), 2);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let mut windows = BucketMap::new();
        windows.push("necessary", lib("winapi"));
        windows.push("necessary", lib("winapi"));

        let mut map = BucketMap::new();
        map.push("necessary", lib("serde").with_tasks(["build"]));
        map.push("necessary", lib("serde").with_tasks(["test"]));
        map.insert(
            "groups",
            Bucket::Groups(IndexMap::from([(
                "test".to_string(),
                vec![lib("rspec"), lib("rspec")],
            )])),
        );
        map.insert(
            "target",
            Bucket::Targets(IndexMap::from([("cfg(windows)".to_string(), windows)])),
        );

        let once = dedup(&map, MergedField::AssociatedTasks);
        let twice = dedup(&once, MergedField::AssociatedTasks);
        assert_eq!(once, twice);
        assert_eq!(once.ingredients().len(), 3);
    }

    #[test]
    fn test_groups_are_deduplicated_separately() {
        let mut map = BucketMap::new();
        map.insert(
            "groups",
            Bucket::Groups(IndexMap::from([
                ("development".to_string(), vec![lib("debug")]),
                ("test".to_string(), vec![lib("debug")]),
            ])),
        );
        let deduped = dedup(&map, MergedField::AssociatedTasks);
        assert_eq!(deduped.ingredients().len(), 2);
    }
}
