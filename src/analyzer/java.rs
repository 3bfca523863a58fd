use std::collections::HashSet;

use anyhow::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use super::buckets;
use crate::classifier::classify;
use crate::models::{BucketMap, Ingredient, IngredientType};

/// Extractor for Maven `pom.xml`.
///
/// Every `<dependency>` artifact (wherever it appears, including
/// `dependencyManagement` and plugin dependencies) is a necessary Library;
/// every `<plugin>` artifact is a Tool under `plugins`.
pub struct PomExtractor;

impl PomExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl super::Extractor for PomExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut deps = BucketMap::new();
        let mut seen_deps: HashSet<String> = HashSet::new();
        let mut seen_plugins: HashSet<String> = HashSet::new();

        // Open element names, innermost last.
        let mut stack: Vec<String> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                    stack.push(name);
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(ref e) if stack.last().map(String::as_str) == Some("artifactId") => {
                    let artifact = e.unescape()?.trim().to_string();
                    let owner = stack.len().checked_sub(2).map(|i| stack[i].as_str());
                    match owner {
                        _ if artifact.is_empty() => {}
                        Some("dependency") => {
                            if seen_deps.insert(artifact.clone()) {
                                deps.push(buckets::NECESSARY, classify(&artifact));
                            }
                        }
                        Some("plugin") => {
                            if seen_plugins.insert(artifact.clone()) {
                                deps.push(
                                    buckets::PLUGINS,
                                    Ingredient::new(artifact, IngredientType::Tool),
                                );
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(deps)
    }
}

/// Extractor for `build.gradle` and `build.gradle.kts`.
///
/// Recognises the `"group:artifact:version"` shorthand (Groovy and Kotlin
/// call syntax) and the `group: ..., name: ...` map form. Test
/// configurations land in `devDependencies`, everything else in `necessary`.
pub struct GradleExtractor;

impl GradleExtractor {
    pub fn new() -> Self {
        Self
    }
}

const GRADLE_CONFIGURATIONS: &str = r"implementation|api|compileOnly|runtimeOnly|annotationProcessor|kapt|ksp|compile|runtime|testImplementation|testCompileOnly|testRuntimeOnly|testCompile|androidTestImplementation";

impl super::Extractor for GradleExtractor {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        // implementation 'g:a:v'   implementation("g:a:v")
        let re_shorthand = Regex::new(&format!(
            r#"\b({})\s*\(?\s*['"]([^'":\s]+):([^'":\s]+)(?::[^'"]*)?['"]"#,
            GRADLE_CONFIGURATIONS
        ))?;
        // implementation group: 'g', name: 'a', version: 'v'
        let re_map = Regex::new(&format!(
            r#"\b({})\s*\(?\s*group\s*:\s*['"]([^'"]+)['"]\s*,\s*name\s*:\s*['"]([^'"]+)['"]"#,
            GRADLE_CONFIGURATIONS
        ))?;

        let mut deps = BucketMap::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for line in text.lines() {
            let line = line.trim();
            if line.starts_with("//") {
                continue;
            }
            let caps = match re_shorthand.captures(line).or_else(|| re_map.captures(line)) {
                Some(caps) => caps,
                None => continue,
            };
            let configuration = &caps[1];
            let artifact = caps[3].to_string();
            let bucket = if configuration.starts_with("test")
                || configuration.starts_with("androidTest")
            {
                buckets::DEV
            } else {
                buckets::NECESSARY
            };
            if seen.insert((bucket.to_string(), artifact.clone())) {
                deps.push(bucket, classify(&artifact));
            }
        }

        Ok(deps)
    }
}
