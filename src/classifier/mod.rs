//! Ingredient type classification.
//!
//! - [`Classifiers`]: pyproject trove classifiers used as type hints.
//! - [`tfm`]: .NET target framework monikers resolved to framework families.
//!
//! Anything without a better signal is a [`IngredientType::Library`].

pub mod tfm;

use std::collections::HashMap;

use anyhow::Result;
use regex::Regex;

use crate::models::{Ingredient, IngredientType};

/// Normalize a package name for comparison: casefold, turn `-`, `_` and `.`
/// into spaces, collapse whitespace.
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .replace(['-', '_', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classify a bare name with no extra information.
pub fn classify(name: &str) -> Ingredient {
    Ingredient::new(name, IngredientType::Library)
}

/// Type hints taken from `Category :: Name :: ...` classifier strings.
#[derive(Debug, Default)]
pub struct Classifiers {
    hints: HashMap<String, IngredientType>,
}

impl Classifiers {
    /// Build the hint table from raw classifier strings.
    ///
    /// Only categories that name an ingredient type are kept, so
    /// `Framework :: Django` hints `django` as a Framework while
    /// `Programming Language :: Python` is ignored. Strings without a `::`
    /// separator are reported and skipped.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        let re = Regex::new(
            r"^([A-Za-z0-9_\-.]+(?:\s*[A-Za-z0-9_\-.]+)*)\s*::\s*([A-Za-z0-9_\-.]+(?:\s*[A-Za-z0-9_\-.]+)*)",
        )?;

        let mut hints = HashMap::new();
        for classifier in raw {
            let classifier = classifier.as_ref();
            match re.captures(classifier) {
                Some(caps) => {
                    if let Some(kind) = IngredientType::from_category(&caps[1]) {
                        // Later entries win, like a dict built from pairs.
                        hints.insert(normalize(&caps[2]), kind);
                    }
                }
                None => tracing::warn!("pyproject: not a classifier: {}", classifier),
            }
        }

        Ok(Self { hints })
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    /// Classify `name`, preferring a classifier hint over the Library default.
    pub fn classify(&self, name: &str) -> Ingredient {
        match self.hints.get(&normalize(name)) {
            Some(kind) => Ingredient::new(name, *kind),
            None => classify(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Flask_SQLAlchemy"), "flask sqlalchemy");
        assert_eq!(normalize("  zope.interface "), "zope interface");
        assert_eq!(normalize("A--B"), "a b");
    }

    #[test]
    fn test_default_is_library() {
        let ingredient = classify("requests");
        assert_eq!(ingredient.kind, IngredientType::Library);
        assert!(ingredient.associated_languages.is_empty());
    }

    #[test]
    fn test_classifier_hint_wins() {
        let classifiers = Classifiers::parse(&[
            "Framework :: Django",
            "Framework :: Django :: 4.2",
            "Programming Language :: Python :: 3",
            "License :: OSI Approved :: MIT License",
        ])
        .unwrap();
        assert_eq!(classifiers.classify("Django").kind, IngredientType::Framework);
        assert_eq!(classifiers.classify("python").kind, IngredientType::Library);
        assert_eq!(classifiers.classify("requests").kind, IngredientType::Library);
    }

    #[test]
    fn test_unparsable_classifier_is_skipped() {
        let classifiers = Classifiers::parse(&["just text"]).unwrap();
        assert!(classifiers.is_empty());
    }
}
