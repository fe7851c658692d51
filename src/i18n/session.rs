//! Per-request locale resolution.
//!
//! `LocaleSession` is shared by all requests. For each request it walks the
//! configured detection order (URL segment, session, cookie, negotiation),
//! produces a `RequestLocaleState`, and decides whether the request should be
//! redirected to the canonical URL of its locale.

use crate::i18n::{
    BaseUrl, LanguageNegotiator, LocaleDescriptor, LocaleMatcher, LocaleRegistry, LocaleSource,
    RequestLocaleState, ResolutionMetrics, RouteAttributes, RouteTranslations,
    TranslationLookup, UrlBuilder, UrlLocalizer,
};
use std::sync::Arc;
use tracing::debug;

/// Read access to the request being served.
pub trait RequestAccessor {
    /// Request path, starting with '/'.
    fn path(&self) -> String;

    /// Full URL including scheme, host and query string.
    fn full_url(&self) -> String;

    /// Raw `Accept-Language` header value.
    fn accept_language(&self) -> Option<String>;

    /// Host name of the client, when known.
    fn remote_host(&self) -> Option<String> {
        None
    }

    /// HTTP method in upper case.
    fn method(&self) -> String {
        "GET".to_string()
    }

    /// Path segment `index` (1-based), ignoring empty segments.
    fn segment(&self, index: usize) -> Option<String> {
        let index = index.checked_sub(1)?;
        self.path()
            .split('/')
            .filter(|s| !s.is_empty())
            .nth(index)
            .map(str::to_string)
    }
}

/// String preferences keyed by name (session values or cookies).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Behaviour switches for locale resolution and URL building.
#[derive(Debug, Clone)]
pub struct LocaleSettings {
    /// Omit the locale segment from URLs of the default locale
    pub hide_default_locale_in_url: bool,

    /// Negotiate from Accept-Language when no stored preference applies
    pub use_accept_language_header: bool,

    /// Sources consulted in order; the default locale is the final fallback
    pub detection_order: Vec<LocaleSource>,

    /// Session key holding the preferred locale
    pub session_key: String,

    /// Cookie holding the preferred locale
    pub cookie_name: String,

    /// Display order for language switchers; unlisted locales follow
    pub locales_order: Vec<String>,

    /// Paths never redirected; a trailing '*' matches any suffix
    pub urls_ignored: Vec<String>,

    /// HTTP methods never redirected
    pub http_methods_ignored: Vec<String>,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            hide_default_locale_in_url: true,
            use_accept_language_header: true,
            detection_order: LocaleSource::default_detection_order(),
            session_key: "locale".to_string(),
            cookie_name: "locale".to_string(),
            locales_order: Vec::new(),
            urls_ignored: Vec::new(),
            http_methods_ignored: ["POST", "PUT", "PATCH", "DELETE"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

/// Locale resolution shared by all requests.
pub struct LocaleSession {
    registry: Arc<LocaleRegistry>,
    negotiator: LanguageNegotiator,
    translations: Arc<dyn TranslationLookup>,
    urls: Arc<dyn UrlBuilder>,
    settings: LocaleSettings,
    metrics: ResolutionMetrics,
}

impl LocaleSession {
    /// Create a session with no route translations and a relative URL
    /// builder.
    pub fn new(registry: Arc<LocaleRegistry>, settings: LocaleSettings) -> Self {
        Self {
            negotiator: LanguageNegotiator::new(Arc::clone(&registry)),
            registry,
            translations: Arc::new(RouteTranslations::new()),
            urls: Arc::new(BaseUrl::relative()),
            settings,
            metrics: ResolutionMetrics::new(),
        }
    }

    pub fn with_translations(mut self, translations: impl TranslationLookup + 'static) -> Self {
        self.translations = Arc::new(translations);
        self
    }

    pub fn with_url_builder(mut self, urls: impl UrlBuilder + 'static) -> Self {
        self.urls = Arc::new(urls);
        self
    }

    pub fn with_matcher(mut self, matcher: impl LocaleMatcher + 'static) -> Self {
        self.negotiator = self.negotiator.with_matcher(matcher);
        self
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &LocaleSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &ResolutionMetrics {
        &self.metrics
    }

    /// Determine the locale of a request and count the outcome in
    /// `metrics()`.
    ///
    /// # Arguments
    /// * `request` - The request being served
    /// * `session` - Session values, read with `settings.session_key`
    /// * `cookies` - Request cookies, read with `settings.cookie_name`
    ///
    /// # Returns
    /// Fresh state for this request. Its `current_locale` is always supported.
    pub fn resolve(
        &self,
        request: &dyn RequestAccessor,
        session: &dyn PreferenceStore,
        cookies: &dyn PreferenceStore,
    ) -> RequestLocaleState {
        let state = self.detect(request, session, cookies);
        self.metrics.record_resolution(state.source);
        state
    }

    /// Same as `resolve`, without touching the metrics.
    pub fn detect(
        &self,
        request: &dyn RequestAccessor,
        session: &dyn PreferenceStore,
        cookies: &dyn PreferenceStore,
    ) -> RequestLocaleState {
        let mut state =
            RequestLocaleState::new(self.registry.default_locale(), request.full_url());

        for &source in &self.settings.detection_order {
            let candidate = match source {
                LocaleSource::Segment => self.locale_segment(request),
                LocaleSource::Session => self.stored(session.get(&self.settings.session_key)),
                LocaleSource::Cookie => self.stored(cookies.get(&self.settings.cookie_name)),
                LocaleSource::Header if self.settings.use_accept_language_header => {
                    self.negotiator.best_match(
                        request.accept_language().as_deref(),
                        request.remote_host().as_deref(),
                    )
                }
                LocaleSource::Header | LocaleSource::Explicit | LocaleSource::Default => None,
            };

            if let Some(locale) = candidate {
                state.current_locale = locale;
                state.source = source;
                break;
            }
        }

        debug!(
            "Resolved locale '{}' from {} for {}",
            state.current_locale, state.source, state.current_url
        );
        state
    }

    /// Set the request's locale explicitly.
    ///
    /// # Returns
    /// * `Some(code)` with the canonical code when `locale` is supported
    /// * `None` when it is not; the request then falls back to the default
    ///   locale if the default is hidden in URLs, otherwise keeps its locale
    pub fn set_locale(&self, state: &mut RequestLocaleState, locale: &str) -> Option<String> {
        match self.registry.canonical(locale) {
            Some(code) => {
                state.current_locale = code.to_string();
                state.source = LocaleSource::Explicit;
                Some(code.to_string())
            }
            None => {
                if self.settings.hide_default_locale_in_url {
                    state.current_locale = self.registry.default_locale().to_string();
                    state.source = LocaleSource::Default;
                }
                None
            }
        }
    }

    /// Canonical code of the request's locale segment, if it has a supported
    /// one.
    pub fn locale_segment(&self, request: &dyn RequestAccessor) -> Option<String> {
        let base_path = self.urls.base_path(None);
        let path = request.path();
        let path = path
            .strip_prefix(base_path.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(&path);

        let segment = path.trim_start_matches('/').split('/').next()?;
        self.registry.segment_locale(segment).map(str::to_string)
    }

    fn stored(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| self.registry.canonical(v.trim()).map(str::to_string))
    }

    /// URL localizer bound to one request's state.
    pub fn urls<'s>(&'s self, state: &'s RequestLocaleState) -> UrlLocalizer<'s> {
        UrlLocalizer::new(
            &self.registry,
            self.translations.as_ref(),
            self.urls.as_ref(),
            state,
            self.settings.hide_default_locale_in_url,
        )
    }

    /// Canonical URL to redirect to, when the request URL is not canonical
    /// for its locale.
    ///
    /// Ignored methods and paths are never redirected.
    pub fn redirect_target(
        &self,
        state: &RequestLocaleState,
        request: &dyn RequestAccessor,
    ) -> Option<String> {
        let method = request.method();
        if self
            .settings
            .http_methods_ignored
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&method))
        {
            return None;
        }

        let path = request.path();
        if self
            .settings
            .urls_ignored
            .iter()
            .any(|pattern| path_matches(pattern, &path))
        {
            return None;
        }

        let canonical = match self.urls(state).localize(
            &state.current_locale,
            Some(&state.current_url),
            &RouteAttributes::new(),
            false,
        ) {
            Ok(canonical) => canonical,
            Err(err) => {
                self.metrics.record_unsupported_locale();
                debug!("No canonical URL: {}", err);
                return None;
            }
        };

        if same_url(&canonical, &state.current_url) {
            return None;
        }

        debug!("Redirecting {} to {}", state.current_url, canonical);
        self.metrics.record_redirect();
        Some(canonical)
    }

    /// Persist the request's locale when it was chosen from the URL or set
    /// explicitly.
    ///
    /// # Returns
    /// `true` if anything was written.
    pub fn remember(
        &self,
        state: &RequestLocaleState,
        session: &mut dyn PreferenceStore,
        cookies: &mut dyn PreferenceStore,
    ) -> bool {
        if !matches!(state.source, LocaleSource::Segment | LocaleSource::Explicit) {
            return false;
        }

        let locale = state.current_locale.as_str();
        let mut written = false;
        if session.get(&self.settings.session_key).as_deref() != Some(locale) {
            session.set(&self.settings.session_key, locale);
            written = true;
        }
        if cookies.get(&self.settings.cookie_name).as_deref() != Some(locale) {
            cookies.set(&self.settings.cookie_name, locale);
            written = true;
        }
        written
    }

    /// Descriptor of the request's current locale.
    pub fn current_descriptor(&self, state: &RequestLocaleState) -> LocaleDescriptor {
        self.registry.describe(&state.current_locale)
    }

    /// Supported locales in display order.
    pub fn supported_locales(&self) -> Vec<&LocaleDescriptor> {
        self.registry.locales_order(&self.settings.locales_order)
    }
}

/// Match a path against an ignore pattern; a trailing '*' matches any suffix.
fn path_matches(pattern: &str, path: &str) -> bool {
    let pattern = pattern.trim_start_matches('/');
    let path = path.trim_start_matches('/');
    match pattern.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => path.trim_end_matches('/') == pattern.trim_end_matches('/'),
    }
}

/// Compare URLs ignoring a trailing slash on the path.
fn same_url(a: &str, b: &str) -> bool {
    fn normalize(url: &str) -> String {
        let split = url.find(['?', '#']).unwrap_or(url.len());
        let (head, tail) = url.split_at(split);
        format!("{}{}", head.trim_end_matches('/'), tail)
    }
    normalize(a) == normalize(b)
}
