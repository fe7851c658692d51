//! Locale registry: single source of truth for supported locales.
//!
//! The registry is built once at start-up from configuration and is read-only
//! afterwards. Share it between request handlers behind an `Arc`; there are
//! no setters and no interior mutability.

use crate::i18n::{known_locale, ConfigurationError, LocaleDescriptor};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Supported locales, the default locale and locale-code aliases.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    default_locale: String,
    supported: IndexMap<String, LocaleDescriptor>,
    /// alias (lower-cased) -> canonical code
    aliases: IndexMap<String, String>,
    /// canonical code -> alias; first configured alias wins
    inverse_aliases: HashMap<String, String>,
}

impl LocaleRegistry {
    /// Build a registry from descriptors.
    ///
    /// # Arguments
    /// * `default_locale` - Code of the default locale; must be supported
    /// * `supported` - Descriptors in display order; must not be empty
    /// * `aliases` - `(alias, canonical)` pairs, e.g. `("en-us", "en")`
    ///
    /// # Returns
    /// * `Ok(LocaleRegistry)` when the configuration is consistent
    /// * `Err(ConfigurationError)` otherwise
    pub fn load<I, A, K, V>(
        default_locale: &str,
        supported: I,
        aliases: A,
    ) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = LocaleDescriptor>,
        A: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let supported: IndexMap<String, LocaleDescriptor> = supported
            .into_iter()
            .map(|descriptor| (descriptor.code.clone(), descriptor))
            .collect();

        if supported.is_empty() {
            return Err(ConfigurationError::NoSupportedLocales);
        }

        if !supported.contains_key(default_locale) {
            return Err(ConfigurationError::UnsupportedDefaultLocale {
                locale: default_locale.to_string(),
            });
        }

        let mut alias_map = IndexMap::new();
        let mut inverse_aliases = HashMap::new();
        for (alias, target) in aliases {
            let alias: String = alias.into();
            let target: String = target.into();
            if !supported.contains_key(&target) {
                return Err(ConfigurationError::DanglingAlias { alias, target });
            }
            inverse_aliases
                .entry(target.clone())
                .or_insert_with(|| alias.clone());
            alias_map.insert(alias.to_ascii_lowercase(), target);
        }

        Ok(Self {
            default_locale: default_locale.to_string(),
            supported,
            aliases: alias_map,
            inverse_aliases,
        })
    }

    /// Build a registry from bare codes using the built-in locale table.
    ///
    /// Fails with `ConfigurationError::UnknownLocale` for a code the table
    /// does not describe.
    pub fn from_codes<A, K, V>(
        default_locale: &str,
        codes: &[&str],
        aliases: A,
    ) -> Result<Self, ConfigurationError>
    where
        A: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let descriptors = codes
            .iter()
            .map(|code| {
                known_locale(code).ok_or_else(|| ConfigurationError::UnknownLocale {
                    code: code.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::load(default_locale, descriptors, aliases)
    }

    /// The configured default locale code.
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// All supported descriptors in configured order.
    pub fn supported(&self) -> impl Iterator<Item = &LocaleDescriptor> {
        self.supported.values()
    }

    /// All supported codes in configured order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.supported.keys().map(String::as_str)
    }

    /// First supported locale in configured order.
    pub fn first(&self) -> &LocaleDescriptor {
        // load() guarantees at least one entry
        &self.supported[0]
    }

    /// Get a descriptor by exact canonical code.
    pub fn get(&self, code: &str) -> Option<&LocaleDescriptor> {
        self.supported.get(code)
    }

    /// Check if a code, or the code it aliases, is supported.
    pub fn is_supported(&self, code: &str) -> bool {
        self.supported.contains_key(self.resolve_alias(code))
    }

    /// Map an alias to its canonical code; unknown codes come back unchanged.
    ///
    /// Supported codes and alias keys are matched case-insensitively; an
    /// exact supported code wins.
    pub fn resolve_alias<'a>(&'a self, code: &'a str) -> &'a str {
        if self.supported.contains_key(code) {
            return code;
        }
        if let Some(target) = self.aliases.get(&code.to_ascii_lowercase()) {
            return target;
        }
        self.supported
            .keys()
            .find(|key| key.eq_ignore_ascii_case(code))
            .map(String::as_str)
            .unwrap_or(code)
    }

    /// Canonical code named by a single URL path segment, with the segment's
    /// spelling matched against codes and aliases case-insensitively.
    pub fn segment_locale(&self, segment: &str) -> Option<&str> {
        if segment.is_empty() {
            return None;
        }
        self.canonical(segment)
    }

    /// Map a canonical code back to its alias; codes without one come back
    /// unchanged.
    ///
    /// When several aliases target the same code, the first one configured
    /// wins.
    pub fn resolve_inverse_alias<'a>(&'a self, code: &'a str) -> &'a str {
        self.inverse_aliases
            .get(code)
            .map(String::as_str)
            .unwrap_or(code)
    }

    /// Canonical code for a supported (possibly aliased) locale.
    pub fn canonical(&self, code: &str) -> Option<&str> {
        self.supported
            .get_key_value(self.resolve_alias(code))
            .map(|(key, _)| key.as_str())
    }

    /// Describe a locale, falling back to a generic left-to-right descriptor
    /// for codes that are not supported.
    pub fn describe(&self, code: &str) -> LocaleDescriptor {
        self.supported
            .get(self.resolve_alias(code))
            .cloned()
            .unwrap_or_else(|| LocaleDescriptor::fallback(code))
    }

    /// All aliases configured for a canonical code, in configured order.
    pub fn aliases_of<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.aliases
            .iter()
            .filter(move |(_, target)| target.as_str() == code)
            .map(|(alias, _)| alias.as_str())
    }

    /// Supported descriptors reordered by `order`.
    ///
    /// Codes listed in `order` come first in that order; unlisted supported
    /// codes follow in configured order. Unknown codes in `order` are skipped.
    pub fn locales_order(&self, order: &[String]) -> Vec<&LocaleDescriptor> {
        let listed = order
            .iter()
            .filter_map(|code| self.supported.get(self.resolve_alias(code)));

        let mut ordered: Vec<&LocaleDescriptor> = Vec::with_capacity(self.supported.len());
        for descriptor in listed.chain(self.supported.values()) {
            if !ordered.iter().any(|d| d.code == descriptor.code) {
                ordered.push(descriptor);
            }
        }
        ordered
    }
}
