//! Translated route patterns.
//!
//! A route key (e.g., "products.show") has one path pattern per locale
//! (e.g., "productos/{slug}"). Patterns use `{name}` for required and
//! `{name?}` for optional placeholders.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;

/// Placeholder values keyed by placeholder name.
pub type RouteAttributes = BTreeMap<String, String>;

/// Source of translated route patterns.
pub trait TranslationLookup: Send + Sync {
    /// Pattern for `key` in `locale`, if one exists.
    fn translate(&self, key: &str, locale: &str) -> Option<String>;

    /// Check whether `key` has a pattern in `locale`.
    fn has(&self, key: &str, locale: &str) -> bool {
        self.translate(key, locale).is_some()
    }

    /// All known route keys, used for reverse lookups from a path.
    fn route_keys(&self) -> Vec<String> {
        Vec::new()
    }
}

/// In-memory route translations: locale -> route key -> pattern.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RouteTranslations {
    by_locale: HashMap<String, IndexMap<String, String>>,
}

impl RouteTranslations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the pattern for a route key in one locale.
    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        pattern: impl Into<String>,
    ) -> &mut Self {
        self.by_locale
            .entry(locale.into())
            .or_default()
            .insert(key.into(), pattern.into().trim_matches('/').to_string());
        self
    }

    /// Parse `{"es": {"products.show": "productos/{slug}"}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut parsed: RouteTranslations =
            serde_json::from_str(json).context("Failed to parse route translations")?;
        for patterns in parsed.by_locale.values_mut() {
            for pattern in patterns.values_mut() {
                *pattern = pattern.trim_matches('/').to_string();
            }
        }
        Ok(parsed)
    }

    /// Load route translations from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read route translations from {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn is_empty(&self) -> bool {
        self.by_locale.values().all(IndexMap::is_empty)
    }
}

impl TranslationLookup for RouteTranslations {
    fn translate(&self, key: &str, locale: &str) -> Option<String> {
        self.by_locale.get(locale)?.get(key).cloned()
    }

    fn route_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for patterns in self.by_locale.values() {
            for key in patterns.keys() {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }
        keys.sort();
        keys
    }
}

/// Characters escaped when a value is written back as a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode a decoded value for use as a single path segment.
///
/// Inverse of the decoding `match_pattern` applies, so an attribute read
/// from a URL is written back in the same form.
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static OPTIONAL_SEGMENT_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{(\w+)(\?)?\}").unwrap())
}

/// Replace `{name}` and `{name?}` placeholders with attribute values.
///
/// Optional placeholders with no value are removed together with their
/// leading slash. Required placeholders with no value are left as written.
///
/// # Example
/// ```
/// use locale_routing::i18n::{substitute_attributes, RouteAttributes};
///
/// let mut attributes = RouteAttributes::new();
/// attributes.insert("slug".to_string(), "zapatos".to_string());
/// assert_eq!(
///     substitute_attributes("/es/productos/{slug}/{page?}", &attributes),
///     "/es/productos/zapatos"
/// );
/// ```
pub fn substitute_attributes(route: &str, attributes: &RouteAttributes) -> String {
    let substituted = placeholder_regex().replace_all(route, |caps: &Captures| {
        attributes
            .get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });

    OPTIONAL_SEGMENT_REGEX
        .get_or_init(|| Regex::new(r"/\{\w+\?\}").unwrap())
        .replace_all(&substituted, "")
        .into_owned()
}

/// Match a path against a route pattern and extract placeholder values.
///
/// The path is compared percent-decoded and without surrounding slashes.
/// Placeholders match a single path segment.
pub fn match_pattern(pattern: &str, path: &str) -> Option<RouteAttributes> {
    let decoded = percent_decode_str(path.trim_matches('/')).decode_utf8_lossy();
    let pattern = pattern.trim_matches('/');

    let mut names: Vec<String> = Vec::new();
    let mut source = String::from("^");
    let mut last = 0;
    for caps in placeholder_regex().captures_iter(pattern) {
        let whole = caps.get(0)?;
        let optional = caps.get(2).is_some();
        let mut literal = &pattern[last..whole.start()];

        if optional && literal.ends_with('/') {
            literal = &literal[..literal.len() - 1];
            source.push_str(&regex::escape(literal));
            source.push_str("(?:/([^/]+))?");
        } else {
            source.push_str(&regex::escape(literal));
            source.push_str(if optional { "([^/]+)?" } else { "([^/]+)" });
        }
        names.push(caps[1].to_string());
        last = whole.end();
    }
    source.push_str(&regex::escape(&pattern[last..]));
    source.push('$');

    let compiled = Regex::new(&source).ok()?;
    let caps = compiled.captures(&decoded)?;

    Some(
        names
            .into_iter()
            .enumerate()
            .filter_map(|(i, name)| caps.get(i + 1).map(|m| (name, m.as_str().to_string())))
            .collect(),
    )
}

/// Find the route key whose pattern in `locale` matches `path`.
///
/// Patterns without placeholders are tried first, so a literal route such as
/// "products/new" wins over "products/{slug}".
pub fn find_translated_route(
    lookup: &dyn TranslationLookup,
    path: &str,
    locale: &str,
) -> Option<(String, RouteAttributes)> {
    let patterns: Vec<(String, String)> = lookup
        .route_keys()
        .into_iter()
        .filter_map(|key| lookup.translate(&key, locale).map(|pattern| (key, pattern)))
        .collect();

    let (literal, templated): (Vec<_>, Vec<_>) = patterns
        .into_iter()
        .partition(|(_, pattern)| !placeholder_regex().is_match(pattern));

    literal
        .into_iter()
        .chain(templated)
        .find_map(|(key, pattern)| match_pattern(&pattern, path).map(|attrs| (key, attrs)))
}
