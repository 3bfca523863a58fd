use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{Bucket, BucketMap, Ingredient, IngredientType};
use crate::pipeline::Generation;

/// Render a colored summary of one repository's cocktail.
pub fn render(generation: &Generation, verbose: bool) {
    let record = &generation.record;

    println!(
        "\n {} v{}",
        "cocktail".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Repository: {}\n", record.name);

    let languages = if record.languages.is_empty() {
        "-".to_string()
    } else {
        record.languages.join(", ")
    };
    let types: Vec<&str> = record.ingredient_types.iter().map(String::as_str).collect();
    let tasks = if record.tasks.is_empty() {
        "-".to_string()
    } else {
        record.tasks.join(", ")
    };

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "COCKTAIL".bold());
    println!(
        " │  {:<48} │",
        format!("Ingredients : {}", record.ingredient_count)
    );
    println!(" │  {:<48} │", truncate(&format!("Languages   : {}", languages)));
    println!(" │  {:<48} │", truncate(&format!("Types       : {}", types.join(", "))));
    println!(" │  {:<48} │", truncate(&format!("Tasks       : {}", tasks)));
    println!(" └────────────────────────────────────────────────────┘\n");

    let rows = rows(generation);
    if rows.is_empty() {
        println!(" {} No ingredients found in manifests\n", "[INFO]".cyan().bold());
        return;
    }

    if verbose {
        println!(" {} All ingredients:\n", "[INGREDIENTS]".green().bold());
        render_table(&rows);
    } else {
        let shown: Vec<_> = rows
            .iter()
            .filter(|(_, i)| i.kind != IngredientType::Library)
            .cloned()
            .collect();
        if !shown.is_empty() {
            println!(" {} Frameworks, tools and resources:\n", "[INGREDIENTS]".green().bold());
            render_table(&shown);
        }
        println!(
            " {} libraries hidden, use --verbose to list them",
            rows.len() - shown.len()
        );
    }
    println!();
}

fn truncate(line: &str) -> String {
    if line.chars().count() > 48 {
        let cut: String = line.chars().take(45).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

/// `(bucket label, ingredient)` for every ingredient; nested ones are labelled `bucket.group`.
fn rows(generation: &Generation) -> Vec<(String, &Ingredient)> {
    let mut rows = Vec::new();
    collect_rows(&generation.record.dependencies, "", &mut rows);
    rows
}

fn collect_rows<'a>(map: &'a BucketMap, prefix: &str, rows: &mut Vec<(String, &'a Ingredient)>) {
    for (key, bucket) in map.iter() {
        let label = format!("{}{}", prefix, key);
        match bucket {
            Bucket::List(items) => rows.extend(items.iter().map(|i| (label.clone(), i))),
            Bucket::Groups(groups) => {
                for (group, items) in groups {
                    let group_label = format!("{}.{}", label, group);
                    rows.extend(items.iter().map(|i| (group_label.clone(), i)));
                }
            }
            Bucket::Targets(targets) => {
                for (target, nested) in targets {
                    collect_rows(nested, &format!("{}.{}.", label, target), rows);
                }
            }
        }
    }
}

fn render_table(rows: &[(String, &Ingredient)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Bucket").add_attribute(Attribute::Bold),
            Cell::new("Ingredient").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Languages").add_attribute(Attribute::Bold),
            Cell::new("Tasks").add_attribute(Attribute::Bold),
        ]);

    for (bucket, ingredient) in rows {
        let type_color = match ingredient.kind {
            IngredientType::Library => Color::Green,
            IngredientType::Framework => Color::Cyan,
            IngredientType::Tool => Color::Yellow,
            IngredientType::Resource => Color::Magenta,
        };
        let languages: Vec<&str> = ingredient.associated_languages.iter().map(String::as_str).collect();
        let tasks: Vec<&str> = ingredient.associated_tasks.iter().map(String::as_str).collect();

        table.add_row(vec![
            Cell::new(bucket),
            Cell::new(&ingredient.name),
            Cell::new(ingredient.kind.to_string()).fg(type_color),
            Cell::new(languages.join(", ")),
            Cell::new(tasks.join(", ")),
        ]);
    }

    println!("{}", table);
}
