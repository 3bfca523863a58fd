use anyhow::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use super::buckets;
use crate::classifier::classify;
use crate::classifier::tfm::FrameworkTable;
use crate::models::{Bucket, BucketMap};

/// MSBuild property (`$(Version)`) and item (`@(Refs)`) placeholders,
/// including one trailing dot.
const PLACEHOLDER: &str = r"[$@]\([^)]*\)\.?";

/// Package name from an `Include`/`id` value: everything before the first
/// comma (assembly-qualified references carry `Version=...` after it),
/// with placeholders removed. `None` when nothing remains.
fn package_name(re: &Regex, raw: &str) -> Option<String> {
    let raw = raw.split(',').next().unwrap_or(raw);
    let name = re.replace_all(raw, "");
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Value of the attribute `key` on `element`, unescaped.
fn attribute(element: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Extractor for SDK and legacy `.csproj`, `.vbproj` and `.fsproj` files.
///
/// `PackageReference` items are `necessary`, `Reference` items are
/// `references`, and `TargetFramework(s)` monikers resolve through the
/// repository's [`FrameworkTable`] into `frameworks`.
pub struct ProjectFileExtractor<'a> {
    table: &'a FrameworkTable,
    languages: &'a [String],
}

impl<'a> ProjectFileExtractor<'a> {
    pub fn new(table: &'a FrameworkTable, languages: &'a [String]) -> Self {
        Self { table, languages }
    }

    fn item(
        &self,
        re: &Regex,
        element: &BytesStart<'_>,
        deps: &mut BucketMap,
    ) -> Result<()> {
        let bucket = match element.name().local_name().as_ref() {
            b"PackageReference" => buckets::NECESSARY,
            b"Reference" => buckets::REFERENCES,
            _ => return Ok(()),
        };
        if let Some(include) = attribute(element, "Include")? {
            match package_name(re, &include) {
                Some(name) => deps.push(bucket, classify(&name)),
                None => tracing::debug!(".NET: reference is only placeholders: {}", include),
            }
        }
        Ok(())
    }
}

impl super::Extractor for ProjectFileExtractor<'_> {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let placeholder_re = Regex::new(PLACEHOLDER)?;
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut deps = BucketMap::new();
        let mut monikers: Vec<String> = Vec::new();
        let mut in_target_framework = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    in_target_framework = matches!(
                        e.name().local_name().as_ref(),
                        b"TargetFramework" | b"TargetFrameworks"
                    );
                    self.item(&placeholder_re, e, &mut deps)?;
                }
                Event::Empty(ref e) => self.item(&placeholder_re, e, &mut deps)?,
                Event::Text(ref e) if in_target_framework => {
                    let value = e.unescape()?;
                    monikers.extend(
                        value
                            .split(';')
                            .map(str::trim)
                            // `$(TargetFrameworks)` and friends are unresolvable here
                            .filter(|m| !m.is_empty() && !m.starts_with('$'))
                            .map(String::from),
                    );
                }
                Event::End(_) => in_target_framework = false,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let frameworks = self
            .table
            .resolve(monikers.iter().map(String::as_str), self.languages);
        deps.insert(buckets::FRAMEWORKS, Bucket::List(frameworks));

        Ok(deps)
    }
}

/// Extractor for legacy NuGet `packages.config`.
pub struct PackagesConfigExtractor<'a> {
    table: &'a FrameworkTable,
    languages: &'a [String],
}

impl<'a> PackagesConfigExtractor<'a> {
    pub fn new(table: &'a FrameworkTable, languages: &'a [String]) -> Self {
        Self { table, languages }
    }
}

impl super::Extractor for PackagesConfigExtractor<'_> {
    fn extract(&self, text: &str) -> Result<BucketMap> {
        let placeholder_re = Regex::new(PLACEHOLDER)?;
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut deps = BucketMap::new();
        let mut monikers: Vec<String> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e)
                    if e.name().local_name().as_ref() == b"package" =>
                {
                    if let Some(id) = attribute(e, "id")? {
                        if let Some(name) = package_name(&placeholder_re, &id) {
                            deps.push(buckets::NECESSARY, classify(&name));
                        }
                    }
                    if let Some(moniker) = attribute(e, "targetFramework")? {
                        if !monikers.contains(&moniker) {
                            monikers.push(moniker);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let frameworks = self
            .table
            .resolve(monikers.iter().map(String::as_str), self.languages);
        deps.insert(buckets::FRAMEWORKS, Bucket::List(frameworks));

        Ok(deps)
    }
}
