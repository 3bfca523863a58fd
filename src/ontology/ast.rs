use std::fmt;

/// A parsed (or about to be rendered) ontology description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub concepts: Vec<String>,
    pub individuals: Vec<String>,
    pub relations: Vec<String>,
    pub triples: Vec<Triple>,
}

/// `subject = relation => object;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

const SECTION: &str = "    ";
const ITEM: &str = "        ";

fn write_list(f: &mut fmt::Formatter<'_>, keyword: &str, items: &[String]) -> fmt::Result {
    writeln!(f, "{}{} {{", SECTION, keyword)?;
    for (i, item) in items.iter().enumerate() {
        let sep = if i + 1 < items.len() { "," } else { "" };
        writeln!(f, "{}{}{}", ITEM, item, sep)?;
    }
    writeln!(f, "{}}}", SECTION)?;
    writeln!(f)
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ontology {}", self.name)?;
        writeln!(f)?;
        write_list(f, "concepts", &self.concepts)?;
        writeln!(f, "{}% Individuals", SECTION)?;
        write_list(f, "individuals", &self.individuals)?;
        write_list(f, "relationships", &self.relations)?;
        writeln!(f, "{}triples {{", SECTION)?;
        for triple in &self.triples {
            writeln!(f, "{}{}", ITEM, triple)?;
        }
        writeln!(f, "{}}}", SECTION)?;
        writeln!(f, ".")
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} => {};", self.subject, self.relation, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layout() {
        let doc = Document {
            name: "Foo".to_string(),
            concepts: vec!["Task".to_string(), "Language".to_string()],
            individuals: vec!["Foo".to_string()],
            relations: vec![],
            triples: vec![Triple::new("Foo", "iof", "System")],
        };
        let text = doc.to_string();
        assert!(text.starts_with("Ontology Foo\n"));
        assert!(text.contains("    concepts {\n        Task,\n        Language\n    }\n"));
        assert!(text.contains("    relationships {\n    }\n"));
        assert!(text.contains("        Foo = iof => System;\n"));
        assert!(text.ends_with("    }\n.\n"));
    }
}
