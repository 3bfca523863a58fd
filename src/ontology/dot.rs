use crate::config::GraphStyle;
use crate::ontology::ast::Document;

/// Relation drawn with [`GraphStyle::instance_edge_style`].
const INSTANCE_OF: &str = "iof";

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render `doc` as a Graphviz digraph: concepts and individuals as styled
/// nodes, triples as labelled edges.
pub fn compile(doc: &Document, style: &GraphStyle) -> String {
    let mut output = format!("digraph {} {{\n", quote(&doc.name));

    for concept in &doc.concepts {
        output.push_str(&format!(
            "    {} [shape={}, style=filled, color={}];\n",
            quote(concept),
            style.concept_shape,
            style.concept_color
        ));
    }
    for individual in &doc.individuals {
        output.push_str(&format!(
            "    {} [shape={}, style=filled, color={}];\n",
            quote(individual),
            style.individual_shape,
            style.individual_color
        ));
    }

    output.push('\n');

    for triple in &doc.triples {
        let extra = if triple.relation == INSTANCE_OF {
            format!(", style={}", style.instance_edge_style)
        } else {
            String::new()
        };
        output.push_str(&format!(
            "    {}->{} [label={}{}];\n",
            quote(&triple.subject),
            quote(&triple.object),
            quote(&triple.relation),
            extra
        ));
    }

    output.push_str("}\n");
    output
}
