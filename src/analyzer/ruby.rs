use anyhow::Result;
use indexmap::IndexMap;
use regex::Regex;

use super::buckets;
use crate::classifier::classify;
use crate::models::{Bucket, BucketMap, Ingredient};

/// An open `do ... end` (or `if`/`case`/...) block in a Gemfile.
enum Block {
    Group(Vec<String>),
    Other,
}

/// Extractor for Bundler `Gemfile`s.
///
/// Gems outside any group go to `necessary`; grouped gems go to
/// `groups[<name>]`, once per group. Groups come from enclosing
/// `group :a, :b do` blocks and from inline `group:`/`groups:` options.
pub struct GemfileExtractor;

impl GemfileExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for GemfileExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let gem_re = Regex::new(r#"^gem\s*\(?\s*['"]([^'"]+)['"]"#)?;
        let group_block_re = Regex::new(r"^group\s*\(?\s*(.+?)\s*\)?\s*do\b")?;
        let inline_group_re = Regex::new(
            r#"(?:\bgroups?\s*:|:groups?\s*=>)\s*(\[[^\]]*\]|:\w+|['"]\w+['"])"#,
        )?;
        let symbol_re = Regex::new(r#":(\w+)|['"](\w+)['"]"#)?;
        let opens_block_re =
            Regex::new(r"^(?:if|unless|case|begin|while|until|def)\b|\bdo\s*(?:\|[^|]*\|)?\s*$")?;

        let symbols = |raw: &str| -> Vec<String> {
            symbol_re
                .captures_iter(raw)
                .filter_map(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| m.as_str().to_string())
                .collect()
        };

        let mut stack: Vec<Block> = Vec::new();
        let mut necessary: Vec<Ingredient> = Vec::new();
        let mut groups: IndexMap<String, Vec<Ingredient>> = IndexMap::new();

        for raw in text.lines() {
            let line = raw.split(" #").next().unwrap_or(raw).trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line == "end" || line.starts_with("end ") || line.starts_with("end.") {
                if stack.pop().is_none() {
                    tracing::warn!("Gemfile: unbalanced 'end'");
                }
                continue;
            }

            if let Some(caps) = group_block_re.captures(line) {
                stack.push(Block::Group(symbols(&caps[1])));
                continue;
            }

            if line.starts_with("gem ") || line.starts_with("gem(") {
                let Some(caps) = gem_re.captures(line) else {
                    tracing::warn!("Gemfile: not a gem declaration: {}", line);
                    continue;
                };
                let name = caps[1].trim();

                // Innermost group block plus any inline options
                let mut gem_groups: Vec<String> = stack
                    .iter()
                    .rev()
                    .find_map(|b| match b {
                        Block::Group(names) => Some(names.clone()),
                        Block::Other => None,
                    })
                    .unwrap_or_default();
                if let Some(inline) = inline_group_re.captures(line) {
                    for group in symbols(&inline[1]) {
                        if !gem_groups.contains(&group) {
                            gem_groups.push(group);
                        }
                    }
                }

                if gem_groups.is_empty() {
                    necessary.push(classify(name));
                } else {
                    for group in gem_groups {
                        groups.entry(group).or_default().push(classify(name));
                    }
                }
                // `gem 'x' do ... end` is rare but legal
                if opens_block_re.is_match(line) {
                    stack.push(Block::Other);
                }
                continue;
            }

            if opens_block_re.is_match(line) {
                stack.push(Block::Other);
            }
        }

        let mut deps = BucketMap::new();
        deps.insert(buckets::NECESSARY, Bucket::List(necessary));
        deps.insert(buckets::GROUPS, Bucket::Groups(groups));
        Ok(deps)
    }
}

#[cfg(test)]
mod tests {
    use super::super::Extractor;
    use super::*;

    const GEMFILE: &str = r#"source "https://rubygems.org"
git_source(:github) { |repo| "https://github.com/#{repo}.git" }

ruby "3.2.2"

gem "rails", "~> 7.1.0"
gem 'pg', '~> 1.1'
gem "bootsnap", require: false # boot faster

group :development, :test do
  gem "debug", platforms: %i[ mri windows ]
  if ENV["CI"]
    gem "simplecov"
  end
end

group :development do
  gem "web-console"
end

platforms :jruby do
  gem "activerecord-jdbc-adapter"
end

gem "rspec-rails", group: :test
gem "rubocop", groups: [:development, :lint]
gem "pry", :group => :development
"#;

    #[test]
    fn test_gemfile_groups() {
        let deps = GemfileExtractor::new().extract(GEMFILE).unwrap();

        match deps.get(buckets::NECESSARY) {
            Some(Bucket::List(items)) => {
                let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
                assert_eq!(
                    names,
                    vec!["rails", "pg", "bootsnap", "activerecord-jdbc-adapter"]
                );
            }
            other => panic!("unexpected {:?}", other),
        }

        match deps.get(buckets::GROUPS) {
            Some(Bucket::Groups(groups)) => {
                let names = |g: &str| -> Vec<&str> {
                    groups[g].iter().map(|i| i.name.as_str()).collect()
                };
                assert_eq!(
                    names("development"),
                    vec!["debug", "simplecov", "web-console", "rubocop", "pry"]
                );
                assert_eq!(names("test"), vec!["debug", "simplecov", "rspec-rails"]);
                assert_eq!(names("lint"), vec!["rubocop"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_gemfile_without_groups_has_no_groups_bucket() {
        let deps = GemfileExtractor::new()
            .extract("source 'https://rubygems.org'\ngem 'sinatra'\n")
            .unwrap();
        assert!(deps.get(buckets::GROUPS).is_none());
        assert!(deps.get(buckets::NECESSARY).is_some());
    }

    #[test]
    fn test_gemfile_malformed_gem_line_is_skipped() {
        let deps = GemfileExtractor::new()
            .extract("gem name_from_variable\ngem 'rack'\n")
            .unwrap();
        match deps.get(buckets::NECESSARY) {
            Some(Bucket::List(items)) => assert_eq!(items.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }
}
