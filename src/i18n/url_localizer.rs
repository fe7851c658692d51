//! Locale-aware URL rewriting.
//!
//! `UrlLocalizer` inserts, replaces or strips the locale segment of a URL
//! while keeping scheme, authority, query string and fragment as they were.
//! A URL never carries more than one locale segment after localization.

use crate::i18n::{
    encode_path_segment, find_translated_route, substitute_attributes, LocaleRegistry,
    RequestLocaleState, RouteAttributes, TranslationLookup, UnsupportedLocaleError,
};
use tracing::debug;
use url::Url;

/// Turns paths into absolute URLs.
pub trait UrlBuilder: Send + Sync {
    /// Absolute URL for `path`. Already absolute input comes back unchanged.
    fn to_absolute(&self, path: &str, base_override: Option<&str>) -> String;

    /// Path prefix of the base URL (e.g., "/app"), empty at the root.
    fn base_path(&self, _base_override: Option<&str>) -> String {
        String::new()
    }
}

/// URL builder rooted at a configured base URL.
#[derive(Debug, Clone)]
pub struct BaseUrl {
    base: Option<Url>,
}

impl BaseUrl {
    /// Root URLs at `base` (e.g., "https://example.com" or
    /// "https://example.com/app").
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Some(clean_base(Url::parse(base)?)),
        })
    }

    /// Builder with no base URL; relative paths stay relative.
    pub fn relative() -> Self {
        Self { base: None }
    }

    fn effective_base(&self, base_override: Option<&str>) -> Option<Url> {
        base_override
            .and_then(|b| Url::parse(b).ok())
            .map(clean_base)
            .or_else(|| self.base.clone())
    }
}

fn clean_base(mut url: Url) -> Url {
    url.set_query(None);
    url.set_fragment(None);
    url
}

impl UrlBuilder for BaseUrl {
    fn to_absolute(&self, path: &str, base_override: Option<&str>) -> String {
        if is_absolute(path) {
            return path.to_string();
        }

        let Some(base) = self.effective_base(base_override) else {
            return path.to_string();
        };

        // "//host/x" keeps its host and takes the base scheme
        if path.starts_with("//") {
            return base
                .join(path)
                .map(String::from)
                .unwrap_or_else(|_| path.to_string());
        }

        let root = base.as_str().trim_end_matches('/');
        if path.is_empty() {
            root.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", root, path)
        } else {
            format!("{}/{}", root, path)
        }
    }

    fn base_path(&self, base_override: Option<&str>) -> String {
        self.effective_base(base_override)
            .map(|base| base.path().trim_end_matches('/').to_string())
            .unwrap_or_default()
    }
}

/// True for well-formed URLs with a host.
pub fn is_absolute(url: &str) -> bool {
    Url::parse(url).map(|u| u.has_host()).unwrap_or(false)
}

/// A URL split into the parts localization treats separately.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UrlParts<'a> {
    /// "scheme://authority" or "//authority"; empty for bare paths
    origin: &'a str,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    fn split(url: &'a str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (url, None),
        };
        let (head, query) = match rest.split_once('?') {
            Some((head, query)) => (head, Some(query)),
            None => (rest, None),
        };

        let authority_start = if head.starts_with("//") {
            Some(2)
        } else {
            head.find("://")
                .filter(|&i| !head[..i].contains('/'))
                .map(|i| i + 3)
        };

        match authority_start {
            Some(start) => {
                let path_start = head[start..]
                    .find('/')
                    .map(|i| start + i)
                    .unwrap_or(head.len());
                Self {
                    origin: &head[..path_start],
                    path: &head[path_start..],
                    query,
                    fragment,
                }
            }
            None => Self {
                origin: "",
                path: head,
                query,
                fragment,
            },
        }
    }

    /// "?query#fragment", whichever parts were present.
    fn suffix(&self) -> String {
        let mut suffix = String::new();
        if let Some(query) = self.query {
            suffix.push('?');
            suffix.push_str(query);
        }
        if let Some(fragment) = self.fragment {
            suffix.push('#');
            suffix.push_str(fragment);
        }
        suffix
    }
}

/// Rewrites URLs for one request.
pub struct UrlLocalizer<'a> {
    registry: &'a LocaleRegistry,
    translations: &'a dyn TranslationLookup,
    urls: &'a dyn UrlBuilder,
    state: &'a RequestLocaleState,
    hide_default_locale: bool,
}

impl<'a> UrlLocalizer<'a> {
    pub fn new(
        registry: &'a LocaleRegistry,
        translations: &'a dyn TranslationLookup,
        urls: &'a dyn UrlBuilder,
        state: &'a RequestLocaleState,
        hide_default_locale: bool,
    ) -> Self {
        Self {
            registry,
            translations,
            urls,
            state,
            hide_default_locale,
        }
    }

    /// Localize `url` (or the current request URL) for `locale`.
    ///
    /// # Arguments
    /// * `locale` - Target locale code or alias
    /// * `url` - URL or path to localize; `None` uses the active route name or
    ///   the current request URL
    /// * `attributes` - Placeholder values for translated routes
    /// * `force_default_location` - Keep the locale segment even for the
    ///   default locale when it would otherwise be hidden
    ///
    /// # Returns
    /// * `Ok(String)` with the localized absolute URL
    /// * `Err(UnsupportedLocaleError)` if `locale` is not supported
    pub fn localize(
        &self,
        locale: &str,
        url: Option<&str>,
        attributes: &RouteAttributes,
        force_default_location: bool,
    ) -> Result<String, UnsupportedLocaleError> {
        let target = self.target(locale)?;
        let base_override = self.state.base_url_override.as_deref();

        let raw = match url {
            Some(url) => self.urls.to_absolute(url, base_override),
            None => {
                if let Some(route) = self.state.active_route_name.as_deref() {
                    let suffix = UrlParts::split(&self.state.current_url).suffix();
                    if let Some(found) = self.url_from_translated_route_name(
                        target,
                        route,
                        attributes,
                        force_default_location,
                    )? {
                        return Ok(format!("{}{}", found, suffix));
                    }
                    debug!("Route '{}' has no URL in '{}', using current URL", route, target);
                }
                self.state.current_url.clone()
            }
        };

        let parts = UrlParts::split(&raw);
        let suffix = parts.suffix();

        let base_path = self.urls.base_path(base_override);
        let path = strip_base_path(parts.path, &base_path);
        let (url_locale, stripped) = self.strip_locale_segment(path);

        let lookup_locale = url_locale.unwrap_or(self.state.current_locale.as_str());
        if let Some((route_key, extracted)) =
            find_translated_route(self.translations, &stripped, lookup_locale)
        {
            let mut merged: RouteAttributes = extracted
                .into_iter()
                .map(|(name, value)| (name, encode_path_segment(&value)))
                .collect();
            merged.extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
            if let Some(found) = self.url_from_translated_route_name(
                target,
                &route_key,
                &merged,
                force_default_location,
            )? {
                return Ok(format!("{}{}", found, suffix));
            }
        }

        let mut localized = stripped;
        if !self.hides(target, force_default_location) {
            localized = if localized.is_empty() {
                target.to_string()
            } else {
                format!("{}/{}", target, localized)
            };
        }

        let mut full_path = format!("{}/{}", base_path.trim_matches('/'), localized)
            .trim_matches('/')
            .to_string();
        if !full_path.is_empty() && (!parts.origin.is_empty() || parts.path.starts_with('/')) {
            full_path.insert(0, '/');
        }

        let assembled = format!("{}{}", parts.origin, full_path);
        let absolute = if is_absolute(&assembled) {
            assembled
        } else {
            self.urls.to_absolute(&assembled, base_override)
        };

        Ok(format!("{}{}", absolute.trim_end_matches('/'), suffix))
    }

    /// Localize for the request's current locale.
    pub fn non_localize(&self, url: Option<&str>) -> Result<String, UnsupportedLocaleError> {
        self.localize(
            &self.state.current_locale,
            url,
            &RouteAttributes::new(),
            false,
        )
    }

    /// Build the URL of a translated route.
    ///
    /// # Returns
    /// * `Ok(Some(url))` with the absolute URL
    /// * `Ok(None)` when the resulting path is empty (no translation and the
    ///   locale segment is hidden)
    /// * `Err(UnsupportedLocaleError)` if `locale` is not supported
    pub fn url_from_translated_route_name(
        &self,
        locale: &str,
        route_key: &str,
        attributes: &RouteAttributes,
        force_default_location: bool,
    ) -> Result<Option<String>, UnsupportedLocaleError> {
        let target = self.target(locale)?;

        let mut route = String::new();
        if !self.hides(target, force_default_location) {
            route.push('/');
            route.push_str(target);
        }

        if let Some(translation) = self.translations.translate(route_key, target) {
            route.push('/');
            route.push_str(&translation);
            route = substitute_attributes(&route, attributes);
        }

        if route.is_empty() {
            return Ok(None);
        }

        let absolute = self
            .urls
            .to_absolute(&route, self.state.base_url_override.as_deref());
        Ok(Some(absolute.trim_end_matches('/').to_string()))
    }

    /// Localized URL of `url` for each supported locale, in configured order.
    ///
    /// The default locale keeps its segment even when hidden, so a language
    /// switcher link overrides a stored preference; the redirect that
    /// follows lands on the canonical form.
    pub fn localized_alternates(&self, url: Option<&str>) -> Vec<(String, String)> {
        self.registry
            .codes()
            .filter_map(|code| {
                self.localize(code, url, &RouteAttributes::new(), true)
                    .ok()
                    .map(|localized| (code.to_string(), localized))
            })
            .collect()
    }

    /// Resolve the translated route a path belongs to.
    ///
    /// The path may carry a locale segment; it decides the locale the path is
    /// read in. Otherwise `locale` is used.
    pub fn route_name_from_path(
        &self,
        path: &str,
        locale: &str,
    ) -> Option<(String, RouteAttributes)> {
        let base_path = self
            .urls
            .base_path(self.state.base_url_override.as_deref());
        let path = strip_base_path(UrlParts::split(path).path, &base_path);
        let (url_locale, stripped) = self.strip_locale_segment(path);
        let locale = url_locale.unwrap_or_else(|| self.registry.resolve_alias(locale));
        find_translated_route(self.translations, &stripped, locale)
    }

    fn target<'s>(&'s self, locale: &'s str) -> Result<&'s str, UnsupportedLocaleError> {
        self.registry
            .canonical(locale)
            .ok_or_else(|| UnsupportedLocaleError::new(locale))
    }

    fn hides(&self, locale: &str, force_default_location: bool) -> bool {
        !force_default_location
            && self.hide_default_locale
            && locale == self.registry.default_locale()
    }

    /// Remove the locale segment at the start of `path`, if there is one.
    ///
    /// Codes and aliases match case-insensitively. Returns the canonical code
    /// of the removed segment and the remaining path without a leading slash.
    fn strip_locale_segment(&self, path: &str) -> (Option<&'a str>, String) {
        let trimmed = path.trim_start_matches('/');
        let (head, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));

        match self.registry.segment_locale(head) {
            Some(code) => (Some(code), rest.to_string()),
            None => (None, trimmed.to_string()),
        }
    }
}

fn strip_base_path<'p>(path: &'p str, base_path: &str) -> &'p str {
    if base_path.is_empty() {
        return path;
    }
    match path.strip_prefix(base_path) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::RouteTranslations;

    struct Fixture {
        registry: LocaleRegistry,
        translations: RouteTranslations,
        urls: BaseUrl,
        state: RequestLocaleState,
        hide_default: bool,
    }

    impl Fixture {
        fn new(hide_default: bool) -> Self {
            let mut translations = RouteTranslations::new();
            translations
                .insert("en", "products.show", "products/{slug}")
                .insert("es", "products.show", "productos/{slug}")
                .insert("fr", "products.show", "produits/{slug}")
                .insert("es", "blog", "blog/{page?}")
                .insert("en", "blog", "blog/{page?}");

            Self {
                registry: LocaleRegistry::from_codes("en", &["en", "es", "fr"], [("en-us", "en")])
                    .expect("Should build registry"),
                translations,
                urls: BaseUrl::new("http://localhost").expect("Should parse base"),
                state: RequestLocaleState::new("en", "http://localhost/about?x=1"),
                hide_default,
            }
        }

        fn localizer(&self) -> UrlLocalizer<'_> {
            UrlLocalizer::new(
                &self.registry,
                &self.translations,
                &self.urls,
                &self.state,
                self.hide_default,
            )
        }

        fn localize(&self, locale: &str, url: &str) -> String {
            self.localizer()
                .localize(locale, Some(url), &RouteAttributes::new(), false)
                .expect("Should localize")
        }
    }

    fn attrs(pairs: &[(&str, &str)]) -> RouteAttributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ==================== UrlParts Tests ====================

    #[test]
    fn test_split_absolute_url() {
        let parts = UrlParts::split("https://user:pw@example.com:8443/es/a?b=1&c=2#top");
        assert_eq!(parts.origin, "https://user:pw@example.com:8443");
        assert_eq!(parts.path, "/es/a");
        assert_eq!(parts.query, Some("b=1&c=2"));
        assert_eq!(parts.fragment, Some("top"));
        assert_eq!(parts.suffix(), "?b=1&c=2#top");
    }

    #[test]
    fn test_split_bare_path_and_host_only() {
        let parts = UrlParts::split("/es/a?q=http://x");
        assert_eq!(parts.origin, "");
        assert_eq!(parts.path, "/es/a");
        assert_eq!(parts.query, Some("q=http://x"));

        let parts = UrlParts::split("http://example.com");
        assert_eq!(parts.origin, "http://example.com");
        assert_eq!(parts.path, "");
    }

    // ==================== BaseUrl Tests ====================

    #[test]
    fn test_base_url_to_absolute() {
        let urls = BaseUrl::new("https://example.com/app/").expect("Should parse");
        assert_eq!(urls.to_absolute("/es/a", None), "https://example.com/app/es/a");
        assert_eq!(urls.to_absolute("es/a", None), "https://example.com/app/es/a");
        assert_eq!(urls.to_absolute("", None), "https://example.com/app");
        assert_eq!(urls.to_absolute("http://other.test/x", None), "http://other.test/x");
        assert_eq!(urls.to_absolute("//cdn.test/x", None), "https://cdn.test/x");
        assert_eq!(urls.base_path(None), "/app");
    }

    #[test]
    fn test_base_url_override() {
        let urls = BaseUrl::new("https://example.com").expect("Should parse");
        assert_eq!(
            urls.to_absolute("/a", Some("https://example.es")),
            "https://example.es/a"
        );
        assert_eq!(urls.base_path(None), "");
    }

    #[test]
    fn test_relative_builder_keeps_paths() {
        let urls = BaseUrl::relative();
        assert_eq!(urls.to_absolute("/es/a", None), "/es/a");
        assert_eq!(urls.base_path(None), "");
    }

    // ==================== Localize Tests ====================

    #[test]
    fn test_localize_inserts_segment() {
        let fixture = Fixture::new(false);
        assert_eq!(fixture.localize("es", "/products"), "http://localhost/es/products");
    }

    #[test]
    fn test_localize_preserves_query_string() {
        let fixture = Fixture::new(false);
        assert_eq!(
            fixture.localize("es", "/products?page=2&sort=es"),
            "http://localhost/es/products?page=2&sort=es"
        );
    }

    #[test]
    fn test_localize_replaces_existing_segment() {
        let fixture = Fixture::new(false);
        assert_eq!(
            fixture.localize("fr", "http://localhost/es/products"),
            "http://localhost/fr/products"
        );
        assert_eq!(fixture.localize("fr", "/es"), "http://localhost/fr");
    }

    #[test]
    fn test_localize_strips_alias_segment() {
        let fixture = Fixture::new(false);
        assert_eq!(
            fixture.localize("es", "/en-us/products"),
            "http://localhost/es/products"
        );
    }

    #[test]
    fn test_localize_strips_mixed_case_alias_segment() {
        let mut fixture = Fixture::new(false);
        fixture.registry =
            LocaleRegistry::from_codes("en", &["en", "es", "fr"], [("en-US", "en")])
                .expect("Should build registry");
        assert_eq!(
            fixture.localize("es", "/en-US/products"),
            "http://localhost/es/products"
        );
        assert_eq!(
            fixture.localize("es", "/en-us/products"),
            "http://localhost/es/products"
        );
        assert_eq!(fixture.localize("fr", "/ES/products"), "http://localhost/fr/products");
    }

    #[test]
    fn test_localize_protocol_relative_url_keeps_host() {
        let fixture = Fixture::new(false);
        assert_eq!(
            fixture.localize("es", "//cdn.test/x?v=1"),
            "http://cdn.test/es/x?v=1"
        );
    }

    #[test]
    fn test_localize_translated_route_keeps_encoded_attributes() {
        let fixture = Fixture::new(false);
        assert_eq!(
            fixture.localize("es", "http://localhost/es/productos/caf%C3%A9"),
            "http://localhost/es/productos/caf%C3%A9"
        );
        assert_eq!(
            fixture.localize("fr", "/es/productos/a%20b"),
            "http://localhost/fr/produits/a%20b"
        );
    }

    #[test]
    fn test_localize_with_alias_target() {
        let fixture = Fixture::new(false);
        assert_eq!(fixture.localize("en-US", "/products"), "http://localhost/en/products");
    }

    #[test]
    fn test_localize_hides_default_locale() {
        let fixture = Fixture::new(true);
        assert_eq!(fixture.localize("en", "/es/products"), "http://localhost/products");
        assert_eq!(fixture.localize("en", "/en"), "http://localhost");
    }

    #[test]
    fn test_localize_force_default_location() {
        let fixture = Fixture::new(true);
        let url = fixture
            .localizer()
            .localize("en", Some("/products"), &RouteAttributes::new(), true)
            .expect("Should localize");
        assert_eq!(url, "http://localhost/en/products");
    }

    #[test]
    fn test_localize_keeps_host_port_and_scheme() {
        let fixture = Fixture::new(false);
        assert_eq!(
            fixture.localize("es", "https://user@shop.test:8443/fr/cart/?a=1"),
            "https://user@shop.test:8443/es/cart?a=1"
        );
    }

    #[test]
    fn test_localize_does_not_strip_partial_segment() {
        let fixture = Fixture::new(false);
        assert_eq!(fixture.localize("es", "/english"), "http://localhost/es/english");
        assert_eq!(fixture.localize("es", "/frames/x"), "http://localhost/es/frames/x");
    }

    #[test]
    fn test_localize_unsupported_locale() {
        let fixture = Fixture::new(false);
        let result = fixture
            .localizer()
            .localize("de", Some("/products"), &RouteAttributes::new(), false);
        assert_eq!(result, Err(UnsupportedLocaleError::new("de")));
    }

    #[test]
    fn test_localize_without_url_uses_current_url() {
        let fixture = Fixture::new(false);
        let url = fixture
            .localizer()
            .localize("fr", None, &RouteAttributes::new(), false)
            .expect("Should localize");
        assert_eq!(url, "http://localhost/fr/about?x=1");
    }

    #[test]
    fn test_localize_without_url_uses_active_route() {
        let mut fixture = Fixture::new(false);
        fixture.state.set_route_name("products.show");
        let url = fixture
            .localizer()
            .localize("es", None, &attrs(&[("slug", "zapatos")]), false)
            .expect("Should localize");
        assert_eq!(url, "http://localhost/es/productos/zapatos?x=1");
    }

    #[test]
    fn test_localize_translates_known_route() {
        let fixture = Fixture::new(false);
        assert_eq!(
            fixture.localize("es", "/fr/produits/chaussures?c=red"),
            "http://localhost/es/productos/chaussures?c=red"
        );
    }

    #[test]
    fn test_localize_translated_route_uses_current_locale_without_segment() {
        let fixture = Fixture::new(true);
        assert_eq!(
            fixture.localize("fr", "/products/shoes"),
            "http://localhost/fr/produits/shoes"
        );
    }

    #[test]
    fn test_localize_with_base_path() {
        let mut fixture = Fixture::new(false);
        fixture.urls = BaseUrl::new("http://localhost/app").expect("Should parse");
        assert_eq!(
            fixture.localize("es", "http://localhost/app/fr/cart"),
            "http://localhost/app/es/cart"
        );
    }

    #[test]
    fn test_localize_with_base_url_override() {
        let mut fixture = Fixture::new(false);
        fixture.state.set_base_url("https://example.es");
        assert_eq!(fixture.localize("es", "/cart"), "https://example.es/es/cart");
    }

    #[test]
    fn test_localize_relative_builder_passes_bare_path() {
        let mut fixture = Fixture::new(false);
        fixture.urls = BaseUrl::relative();
        assert_eq!(fixture.localize("es", "/fr/cart"), "/es/cart");
    }

    #[test]
    fn test_localize_twice_never_stacks_segments() {
        let fixture = Fixture::new(false);
        let once = fixture.localize("es", "/cart?x=1");
        let twice = fixture.localize("fr", &once);
        assert_eq!(twice, "http://localhost/fr/cart?x=1");
    }

    #[test]
    fn test_non_localize_uses_current_locale() {
        let fixture = Fixture::new(true);
        let url = fixture
            .localizer()
            .non_localize(Some("/es/cart"))
            .expect("Should localize");
        assert_eq!(url, "http://localhost/cart");
    }

    // ==================== Translated Route Tests ====================

    #[test]
    fn test_url_from_translated_route_name() {
        let fixture = Fixture::new(false);
        let url = fixture
            .localizer()
            .url_from_translated_route_name("es", "products.show", &attrs(&[("slug", "zapatos")]), false)
            .expect("Should build");
        assert_eq!(url, Some("http://localhost/es/productos/zapatos".to_string()));
    }

    #[test]
    fn test_url_from_translated_route_name_hidden_default() {
        let fixture = Fixture::new(true);
        let url = fixture
            .localizer()
            .url_from_translated_route_name("en", "blog", &RouteAttributes::new(), false)
            .expect("Should build");
        assert_eq!(url, Some("http://localhost/blog".to_string()));
    }

    #[test]
    fn test_url_from_translated_route_name_not_found() {
        let fixture = Fixture::new(true);
        let url = fixture
            .localizer()
            .url_from_translated_route_name("en", "missing", &RouteAttributes::new(), false)
            .expect("Should build");
        assert_eq!(url, None);
    }

    #[test]
    fn test_url_from_translated_route_name_missing_translation_keeps_prefix() {
        let fixture = Fixture::new(false);
        let url = fixture
            .localizer()
            .url_from_translated_route_name("fr", "blog", &RouteAttributes::new(), false)
            .expect("Should build");
        assert_eq!(url, Some("http://localhost/fr".to_string()));
    }

    #[test]
    fn test_url_from_translated_route_name_unresolved_required() {
        let fixture = Fixture::new(false);
        let url = fixture
            .localizer()
            .url_from_translated_route_name("es", "products.show", &RouteAttributes::new(), false)
            .expect("Should build");
        assert_eq!(url, Some("http://localhost/es/productos/{slug}".to_string()));
    }

    #[test]
    fn test_url_from_translated_route_name_unsupported() {
        let fixture = Fixture::new(false);
        let result = fixture.localizer().url_from_translated_route_name(
            "xx",
            "blog",
            &RouteAttributes::new(),
            false,
        );
        assert!(result.is_err());
    }

    // ==================== Alternates & Reverse Lookup Tests ====================

    #[test]
    fn test_localized_alternates() {
        let fixture = Fixture::new(true);
        let alternates = fixture.localizer().localized_alternates(Some("/es/cart"));
        assert_eq!(
            alternates,
            vec![
                ("en".to_string(), "http://localhost/en/cart".to_string()),
                ("es".to_string(), "http://localhost/es/cart".to_string()),
                ("fr".to_string(), "http://localhost/fr/cart".to_string()),
            ]
        );
    }

    #[test]
    fn test_route_name_from_path() {
        let fixture = Fixture::new(false);
        let localizer = fixture.localizer();
        assert_eq!(
            localizer.route_name_from_path("/es/productos/zapatos", "en"),
            Some(("products.show".to_string(), attrs(&[("slug", "zapatos")])))
        );
        assert_eq!(
            localizer.route_name_from_path("/products/shoes", "en-us"),
            Some(("products.show".to_string(), attrs(&[("slug", "shoes")])))
        );
        assert_eq!(localizer.route_name_from_path("/es/nada/x/y", "es"), None);
    }
}
