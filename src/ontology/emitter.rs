use std::collections::HashSet;

use indexmap::IndexSet;

use crate::models::{Ingredient, IngredientType, RepositoryRecord};
use crate::ontology::ast::{Document, Triple};

/// Which ontology to emit for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The complete cocktail ontology with the conceptual plan.
    Full,
    /// The trimmed Cocktail Identity Card.
    IdentityCard,
}

/// Relation vocabulary declared by every document.
pub const RELATIONS: [&str; 10] = [
    "uses",
    "contains",
    "requires",
    "supports",
    "is_used_for",
    "extends",
    "encloses",
    "iof",
    "pof",
    "isa",
];

const FULL_CONCEPTS: [&str; 10] = [
    "System",
    "Ingredient",
    "Cocktail",
    "Development",
    "Resource",
    "Task",
    "Language",
    "Library",
    "Framework",
    "Tool",
];

const CARD_CONCEPTS: [&str; 3] = ["Resource", "Task", "Language"];

/// Turn an arbitrary name into a token the grammar reads back unchanged.
///
/// Whitespace and `{ } , ; % "` become `_`; the bare operator words `=`,
/// `=>` and `.` get a leading `_`.
pub fn identifier(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '{' | '}' | ',' | ';' | '%' | '"') {
                '_'
            } else {
                c
            }
        })
        .collect();
    match cleaned.as_str() {
        "" => "_".to_string(),
        "=" | "=>" | "." => format!("_{}", cleaned),
        _ => cleaned,
    }
}

/// Individuals declared so far, in declaration order.
#[derive(Debug, Default)]
struct Declared {
    names: IndexSet<String>,
}

impl Declared {
    fn declare(&mut self, name: &str) {
        self.names.insert(identifier(name));
    }

    fn into_vec(self) -> Vec<String> {
        self.names.into_iter().collect()
    }
}

/// Well-known individual names of one repository.
struct Names {
    app: String,
    development: String,
    cocktail: String,
}

impl Names {
    fn new(record: &RepositoryRecord) -> Self {
        let app = identifier(&record.name);
        Self {
            development: format!("{}Development", app),
            cocktail: format!("{}Cocktail", app),
            app,
        }
    }
}

fn individuals(record: &RepositoryRecord, names: &Names, ingredients: &[&Ingredient]) -> Vec<String> {
    let mut declared = Declared::default();
    declared.declare(&names.app);
    declared.declare(&names.development);
    declared.declare(&names.cocktail);
    for lang in &record.languages {
        declared.declare(lang);
    }
    for ingredient in ingredients {
        declared.declare(&ingredient.name);
    }
    // Triple targets that are not ingredients themselves
    for ingredient in ingredients {
        if ingredient.kind == IngredientType::Resource {
            continue;
        }
        for lang in &ingredient.associated_languages {
            declared.declare(lang);
        }
        for task in &ingredient.associated_tasks {
            declared.declare(task);
        }
    }
    for task in &record.tasks {
        declared.declare(task);
    }
    declared.into_vec()
}

fn plan(mode: Mode, names: &Names) -> Vec<Triple> {
    match mode {
        Mode::Full => vec![
            Triple::new("System", "requires", "Development"),
            Triple::new("Resource", "supports", "System"),
            Triple::new("Development", "uses", "Cocktail"),
            Triple::new("Task", "pof", "Development"),
            Triple::new("Ingredient", "pof", "Cocktail"),
            Triple::new("Ingredient", "is_used_for", "Task"),
            Triple::new("Language", "isa", "Ingredient"),
            Triple::new("Library", "isa", "Ingredient"),
            Triple::new("Framework", "isa", "Ingredient"),
            Triple::new("Tool", "isa", "Ingredient"),
            Triple::new("Library", "extends", "Language"),
            Triple::new("Framework", "encloses", "Language"),
            Triple::new("Tool", "supports", "Language"),
            Triple::new(&names.app, "iof", "System"),
            Triple::new(&names.development, "iof", "Development"),
            Triple::new(&names.cocktail, "iof", "Cocktail"),
        ],
        Mode::IdentityCard => vec![
            Triple::new("Resource", "supports", &names.app),
            Triple::new("Task", "pof", &names.development),
        ],
    }
}

/// Triples of one ingredient, keyed on its type.
fn ingredient_triples(ingredient: &Ingredient, names: &Names, triples: &mut Vec<Triple>) {
    let id = identifier(&ingredient.name);

    if ingredient.kind == IngredientType::Resource {
        triples.push(Triple::new(&id, "iof", "Resource"));
        triples.push(Triple::new(&id, "supports", &names.app));
        return;
    }

    triples.push(Triple::new(&id, "iof", ingredient.kind.to_string()));
    triples.push(Triple::new(&id, "pof", &names.cocktail));

    let language_relation = match ingredient.kind {
        IngredientType::Library => "extends",
        IngredientType::Framework => "encloses",
        _ => "supports",
    };
    for lang in &ingredient.associated_languages {
        triples.push(Triple::new(&id, language_relation, identifier(lang)));
    }
    for task in &ingredient.associated_tasks {
        triples.push(Triple::new(&id, "is_used_for", identifier(task)));
    }
}

/// Build the ontology document for `record`.
pub fn document(record: &RepositoryRecord, mode: Mode) -> Document {
    let names = Names::new(record);
    let ingredients = record.dependencies.ingredients();

    let concepts: Vec<String> = match mode {
        Mode::Full => FULL_CONCEPTS.iter().map(|c| c.to_string()).collect(),
        Mode::IdentityCard => {
            let mut concepts: IndexSet<String> =
                CARD_CONCEPTS.iter().map(|c| c.to_string()).collect();
            concepts.extend(record.ingredient_types.iter().cloned());
            concepts.into_iter().collect()
        }
    };

    let mut triples = plan(mode, &names);
    triples.push(Triple::new(&names.app, "requires", &names.development));
    triples.push(Triple::new(&names.development, "uses", &names.cocktail));

    for task in &record.tasks {
        let task = identifier(task);
        triples.push(Triple::new(&task, "isa", "Task"));
        triples.push(Triple::new(&task, "pof", &names.development));
    }

    for lang in &record.languages {
        let lang = identifier(lang);
        triples.push(Triple::new(&lang, "iof", "Language"));
        triples.push(Triple::new(&lang, "pof", &names.cocktail));
    }

    // An ingredient listed in several buckets is described once
    let mut described: HashSet<String> = HashSet::new();
    for ingredient in &ingredients {
        if described.insert(identifier(&ingredient.name)) {
            ingredient_triples(ingredient, &names, &mut triples);
        }
    }

    Document {
        name: names.app.clone(),
        concepts,
        individuals: individuals(record, &names, &ingredients),
        relations: RELATIONS.iter().map(|r| r.to_string()).collect(),
        triples,
    }
}

/// Emit the ontology description text for `record`.
pub fn translate(record: &RepositoryRecord, mode: Mode) -> String {
    document(record, mode).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BucketMap, RepositorySnapshot};
    use crate::normalizer::normalize;
    use crate::ontology::parser::parse;

    fn record(deps: BucketMap, languages: &[&str]) -> RepositoryRecord {
        let mut snapshot = RepositorySnapshot {
            name: "Foo".to_string(),
            ..Default::default()
        };
        for lang in languages {
            snapshot.languages.insert(lang.to_string(), 100);
        }
        normalize(&snapshot, deps)
    }

    fn triple_strings(doc: &Document) -> Vec<String> {
        doc.triples.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_single_requirement() {
        let mut deps = BucketMap::new();
        deps.push("necessary", Ingredient::new("requests", IngredientType::Library));
        let doc = document(&record(deps, &[]), Mode::Full);

        assert_eq!(doc.name, "Foo");
        assert_eq!(
            doc.individuals,
            vec!["Foo", "FooDevelopment", "FooCocktail", "requests"]
        );
        let triples = triple_strings(&doc);
        assert!(triples.contains(&"requests = iof => Library;".to_string()));
        assert!(triples.contains(&"requests = pof => FooCocktail;".to_string()));
        assert!(triples.contains(&"Foo = iof => System;".to_string()));
    }

    #[test]
    fn test_names_are_unique_across_buckets() {
        let mut deps = BucketMap::new();
        deps.push("necessary", Ingredient::new("numpy", IngredientType::Library));
        deps.push("devDependencies", Ingredient::new("numpy", IngredientType::Library));
        deps.push("lockfile", Ingredient::new("numpy", IngredientType::Library));
        let doc = document(&record(deps, &["Python"]), Mode::IdentityCard);

        let unique: HashSet<_> = doc.individuals.iter().collect();
        assert_eq!(unique.len(), doc.individuals.len());
        let numpy_iof = doc
            .triples
            .iter()
            .filter(|t| t.subject == "numpy" && t.relation == "iof")
            .count();
        assert_eq!(numpy_iof, 1);
    }

    #[test]
    fn test_modes_share_instance_triples() {
        let mut deps = BucketMap::new();
        deps.push(
            "devDependencies",
            Ingredient::new("pytest", IngredientType::Library)
                .with_languages(["Python"])
                .with_tasks(["testing"]),
        );
        deps.push("os", Ingredient::new("linux", IngredientType::Resource));
        let rec = record(deps, &["Python"]);

        let full = document(&rec, Mode::Full);
        let card = document(&rec, Mode::IdentityCard);
        assert_eq!(full.triples[16..], card.triples[2..]);
        assert_eq!(full.individuals, card.individuals);
        for doc in [&full, &card] {
            let triples = triple_strings(doc);
            assert!(triples.contains(&"testing = isa => Task;".to_string()));
            assert!(triples.contains(&"testing = pof => FooDevelopment;".to_string()));
            assert!(triples.contains(&"pytest = is_used_for => testing;".to_string()));
        }
        assert!(card.individuals.contains(&"testing".to_string()));
        assert_eq!(
            card.concepts,
            vec!["Resource", "Task", "Language", "Library"]
        );
    }

    #[test]
    fn test_type_specific_relations() {
        let mut deps = BucketMap::new();
        deps.push(
            "frameworks",
            Ingredient::new(".NET", IngredientType::Framework).with_languages(["C#"]),
        );
        deps.push(
            "tools",
            Ingredient::new("black", IngredientType::Tool).with_languages(["Python"]),
        );
        deps.push("os", Ingredient::new("darwin", IngredientType::Resource));
        let triples = triple_strings(&document(&record(deps, &["C#"]), Mode::IdentityCard));

        assert!(triples.contains(&".NET = encloses => C#;".to_string()));
        assert!(triples.contains(&"black = supports => Python;".to_string()));
        assert!(triples.contains(&"darwin = supports => Foo;".to_string()));
        assert!(!triples.contains(&"darwin = pof => FooCocktail;".to_string()));
    }

    #[test]
    fn test_referenced_names_are_declared() {
        let mut deps = BucketMap::new();
        deps.push(
            "devDependencies",
            Ingredient::new("jest", IngredientType::Library)
                .with_languages(["TypeScript"])
                .with_tasks(["development"]),
        );
        let doc = document(&record(deps, &[]), Mode::Full);
        let declared: HashSet<_> = doc.individuals.iter().cloned().collect();
        let concepts: HashSet<_> = doc.concepts.iter().cloned().collect();
        for triple in &doc.triples {
            assert!(
                declared.contains(&triple.subject) || concepts.contains(&triple.subject),
                "undeclared subject {}",
                triple.subject
            );
            assert!(
                declared.contains(&triple.object) || concepts.contains(&triple.object),
                "undeclared object {}",
                triple.object
            );
        }
    }

    #[test]
    fn test_output_parses_back() {
        let mut deps = BucketMap::new();
        for name in ["=>", ".", "weird name", "semi;colon", "{brace}", "100%", "say\"hi\""] {
            deps.push("necessary", Ingredient::new(name, IngredientType::Library));
        }
        let rec = record(deps, &["Jupyter Notebook", "C++"]);
        for mode in [Mode::Full, Mode::IdentityCard] {
            let doc = document(&rec, mode);
            let parsed = parse(&doc.to_string()).unwrap();
            assert_eq!(parsed, doc);
        }
    }

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("Jupyter Notebook"), "Jupyter_Notebook");
        assert_eq!(identifier("=>"), "_=>");
        assert_eq!(identifier("."), "_.");
        assert_eq!(identifier("a,b;c"), "a_b_c");
        assert_eq!(identifier("@scope/pkg"), "@scope/pkg");
        assert_eq!(identifier("  "), "_");
    }
}
