//! HTTP glue for locale routing.
//!
//! `localize_request` runs in front of localized pages. It resolves the
//! request locale, remembers explicit choices in a cookie and the session,
//! redirects to the canonical URL of the locale, and hands the resolved
//! `RequestLocaleState` to handlers through request extensions.

use crate::i18n::{
    LocaleDescriptor, LocaleSession, PreferenceStore, RequestAccessor, RequestLocaleState,
    RouteAttributes, UnsupportedLocaleError,
};
use axum::{
    extract::{Query, Request, State},
    http::{
        header::{ACCEPT_LANGUAGE, COOKIE, HOST, LOCATION, SET_COOKIE, VARY},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use indexmap::IndexMap;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};
use uuid::Uuid;

/// Cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "session_id";

/// Characters escaped in cookie values.
const COOKIE_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b',')
    .add(b';')
    .add(b'\\')
    .add(b'%');

/// One year, in seconds.
const COOKIE_MAX_AGE: u64 = 31_536_000;

/// Sessions kept before the oldest are evicted.
pub const MAX_SESSIONS: usize = 10_000;

// ==================== Request Access ====================

/// `RequestAccessor` over the parts of an incoming HTTP request.
pub struct HttpRequest<'a> {
    parts: &'a Parts,
}

impl<'a> HttpRequest<'a> {
    pub fn new(parts: &'a Parts) -> Self {
        Self { parts }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn scheme(&self) -> &str {
        self.header("x-forwarded-proto")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .or_else(|| self.parts.uri.scheme_str())
            .unwrap_or("http")
    }

    fn host(&self) -> &str {
        self.header(HOST.as_str())
            .or_else(|| self.parts.uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost")
    }
}

impl RequestAccessor for HttpRequest<'_> {
    fn path(&self) -> String {
        self.parts.uri.path().to_string()
    }

    fn full_url(&self) -> String {
        let path_and_query = self
            .parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("{}://{}{}", self.scheme(), self.host(), path_and_query)
    }

    fn accept_language(&self) -> Option<String> {
        self.header(ACCEPT_LANGUAGE.as_str()).map(str::to_string)
    }

    fn method(&self) -> String {
        self.parts.method.as_str().to_ascii_uppercase()
    }
}

// ==================== Preference Stores ====================

/// Request cookies, plus the cookies written while handling the request.
#[derive(Debug, Clone, Default)]
pub struct CookiePreferences {
    values: HashMap<String, String>,
    pending: Vec<(String, String)>,
}

impl CookiePreferences {
    /// Read every `Cookie` header of a request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let values = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| {
                let value = value.trim().trim_matches('"');
                (
                    name.trim().to_string(),
                    percent_decode_str(value).decode_utf8_lossy().into_owned(),
                )
            })
            .collect();

        Self {
            values,
            pending: Vec::new(),
        }
    }

    /// `Set-Cookie` values for the cookies written during this request.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.pending
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}; Path=/; Max-Age={}; SameSite=Lax",
                    name,
                    utf8_percent_encode(value, COOKIE_VALUE),
                    COOKIE_MAX_AGE
                )
            })
            .collect()
    }
}

impl PreferenceStore for CookiePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.pending.retain(|(name, _)| name != key);
        self.pending.push((key.to_string(), value.to_string()));
    }
}

/// Values stored for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionPreferences(HashMap<String, String>);

impl PreferenceStore for SessionPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }
}

/// In-memory sessions keyed by server-issued ids.
///
/// Only ids handed out by `save` are ever looked up, and at most `capacity`
/// sessions are kept; the least recently saved one goes first.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<IndexMap<String, SessionPreferences>>>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(IndexMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Values of a session this store issued.
    pub async fn load(&self, id: &str) -> Option<SessionPreferences> {
        self.sessions.lock().await.get(id).cloned()
    }

    /// Store `preferences` under `id` if it is a known session, otherwise
    /// under a freshly issued id.
    ///
    /// # Returns
    /// The id the values were stored under.
    pub async fn save(&self, id: Option<&str>, preferences: SessionPreferences) -> String {
        let mut sessions = self.sessions.lock().await;

        let id = match id.and_then(|id| sessions.shift_remove_full(id)) {
            Some((_, id, _)) => id,
            None => Uuid::new_v4().to_string(),
        };
        sessions.insert(id.clone(), preferences);

        while sessions.len() > self.capacity {
            if let Some((evicted, _)) = sessions.shift_remove_index(0) {
                debug!("Evicted session {}", evicted);
            }
        }
        id
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// ==================== App State ====================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Locale resolution for every request
    pub locales: Arc<LocaleSession>,

    /// Session values
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(locales: LocaleSession) -> Self {
        Self {
            locales: Arc::new(locales),
            sessions: SessionStore::default(),
        }
    }
}

// ==================== Middleware ====================

/// The request's session, if its `session_id` cookie names one this server
/// issued. Unknown ids are treated as no session.
async fn known_session(
    sessions: &SessionStore,
    cookies: &CookiePreferences,
) -> (Option<String>, SessionPreferences) {
    let Some(id) = cookies.get(SESSION_COOKIE) else {
        return (None, SessionPreferences::default());
    };
    match sessions.load(&id).await {
        Some(preferences) => (Some(id), preferences),
        None => {
            debug!("Ignoring unknown session id");
            (None, SessionPreferences::default())
        }
    }
}

/// Resolve the locale of a request and redirect to its canonical URL.
pub async fn localize_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let mut cookies = CookiePreferences::from_headers(&parts.headers);

    let (session_id, mut preferences) = known_session(&state.sessions, &cookies).await;

    let http_request = HttpRequest::new(&parts);
    let locale_state = state
        .locales
        .resolve(&http_request, &preferences, &cookies);

    if state
        .locales
        .remember(&locale_state, &mut preferences, &mut cookies)
    {
        let id = state.sessions.save(session_id.as_deref(), preferences).await;
        if session_id.as_deref() != Some(id.as_str()) {
            cookies.set(SESSION_COOKIE, &id);
        }
    }

    let redirect = state.locales.redirect_target(&locale_state, &http_request);

    let mut response = match redirect.map(|target| HeaderValue::from_str(&target)) {
        Some(Ok(location)) => {
            let mut response = StatusCode::FOUND.into_response();
            response.headers_mut().insert(LOCATION, location);
            response
        }
        other => {
            if let Some(Err(err)) = other {
                warn!("Skipping redirect with invalid location: {}", err);
            }
            parts.extensions.insert(locale_state);
            next.run(Request::from_parts(parts, body)).await
        }
    };

    let headers = response.headers_mut();
    headers.append(VARY, HeaderValue::from_static("Accept-Language"));
    for cookie in cookies.set_cookie_headers() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(err) => warn!("Dropping invalid cookie: {}", err),
        }
    }

    response
}

// ==================== Handlers ====================

/// Link to the current page in another locale.
#[derive(Debug, Serialize)]
pub struct Alternate {
    pub locale: String,
    pub native: String,
    pub url: String,
}

/// Demo page response.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub locale: String,
    pub source: String,
    pub url: String,
    pub direction: String,
    pub descriptor: LocaleDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    pub alternates: Vec<Alternate>,
}

async fn page(
    State(state): State<AppState>,
    Extension(locale_state): Extension<RequestLocaleState>,
) -> Json<PageResponse> {
    let locales = &state.locales;
    let urls = locales.urls(&locale_state);
    let descriptor = locales.current_descriptor(&locale_state);

    let alternates: HashMap<String, String> = urls
        .localized_alternates(None)
        .into_iter()
        .collect();
    let alternates = locales
        .supported_locales()
        .into_iter()
        .filter_map(|d| {
            alternates.get(&d.code).map(|url| Alternate {
                locale: d.code.clone(),
                native: d.native.clone(),
                url: url.clone(),
            })
        })
        .collect();

    let route = urls
        .route_name_from_path(&locale_state.current_url, &locale_state.current_locale)
        .map(|(key, _)| key);

    Json(PageResponse {
        locale: locale_state.current_locale.clone(),
        source: locale_state.source.to_string(),
        url: locale_state.current_url.clone(),
        direction: descriptor.direction().as_str().to_string(),
        descriptor,
        route,
        alternates,
    })
}

#[derive(Debug, Deserialize)]
pub struct LocalizeQuery {
    pub locale: String,
    pub url: Option<String>,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct LocalizeResponse {
    pub url: String,
}

/// Error response for the JSON API.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub enum ApiError {
    UnsupportedLocale(UnsupportedLocaleError),
}

impl From<UnsupportedLocaleError> for ApiError {
    fn from(err: UnsupportedLocaleError) -> Self {
        ApiError::UnsupportedLocale(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::UnsupportedLocale(err) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// Localize a URL for a locale, relative to the calling request.
async fn localize(
    State(state): State<AppState>,
    parts: Parts,
    Query(query): Query<LocalizeQuery>,
) -> Result<Json<LocalizeResponse>, ApiError> {
    let cookies = CookiePreferences::from_headers(&parts.headers);
    let (_, preferences) = known_session(&state.sessions, &cookies).await;
    let locale_state = state
        .locales
        .detect(&HttpRequest::new(&parts), &preferences, &cookies);

    let url = state
        .locales
        .urls(&locale_state)
        .localize(
            &query.locale,
            query.url.as_deref(),
            &RouteAttributes::new(),
            query.force,
        )
        .inspect_err(|err| {
            state.locales.metrics().record_unsupported_locale();
            debug!("Rejected localize request: {}", err);
        })?;

    Ok(Json(LocalizeResponse { url }))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.locales.metrics().report())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub default_locale: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_locale: state.locales.registry().default_locale().to_string(),
    })
}

/// Build the application router.
///
/// Pages go through `localize_request`; `/health`, `/metrics` and
/// `/api/localize` are served without locale handling.
pub fn router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(page))
        .route("/*path", get(page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            localize_request,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/localize", get(localize))
        .merge(pages)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequestBuilder;

    fn parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = HttpRequestBuilder::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    // ==================== HttpRequest Tests ====================

    #[test]
    fn test_full_url_from_host_header() {
        let parts = parts("/es/products?page=2", &[("host", "shop.test")]);
        let request = HttpRequest::new(&parts);
        assert_eq!(request.full_url(), "http://shop.test/es/products?page=2");
        assert_eq!(request.path(), "/es/products");
        assert_eq!(request.segment(1).as_deref(), Some("es"));
        assert_eq!(request.method(), "GET");
    }

    #[test]
    fn test_full_url_honours_forwarded_proto() {
        let parts = parts(
            "/",
            &[("host", "shop.test"), ("x-forwarded-proto", "https, http")],
        );
        assert_eq!(HttpRequest::new(&parts).full_url(), "https://shop.test/");
    }

    #[test]
    fn test_full_url_without_host() {
        let parts = parts("/about", &[]);
        assert_eq!(HttpRequest::new(&parts).full_url(), "http://localhost/about");
    }

    #[test]
    fn test_accept_language_header() {
        let parts = parts("/", &[("accept-language", "fr-FR,fr;q=0.9")]);
        assert_eq!(
            HttpRequest::new(&parts).accept_language().as_deref(),
            Some("fr-FR,fr;q=0.9")
        );

        let parts = parts_empty_header();
        assert_eq!(HttpRequest::new(&parts).accept_language(), None);
    }

    fn parts_empty_header() -> Parts {
        parts("/", &[("accept-language", "  ")])
    }

    // ==================== Cookie Tests ====================

    #[test]
    fn test_cookie_parsing() {
        let parts = parts(
            "/",
            &[("cookie", "locale=pt-BR; session_id=abc"), ("cookie", "theme=\"dark\"")],
        );
        let cookies = CookiePreferences::from_headers(&parts.headers);
        assert_eq!(cookies.get("locale").as_deref(), Some("pt-BR"));
        assert_eq!(cookies.get(SESSION_COOKIE).as_deref(), Some("abc"));
        assert_eq!(cookies.get("theme").as_deref(), Some("dark"));
        assert_eq!(cookies.get("missing"), None);
        assert!(cookies.set_cookie_headers().is_empty());
    }

    #[test]
    fn test_cookie_writes_are_pending() {
        let mut cookies = CookiePreferences::default();
        cookies.set("locale", "es");
        cookies.set("locale", "fr");

        assert_eq!(cookies.get("locale").as_deref(), Some("fr"));
        assert_eq!(
            cookies.set_cookie_headers(),
            vec!["locale=fr; Path=/; Max-Age=31536000; SameSite=Lax".to_string()]
        );
    }

    #[test]
    fn test_cookie_value_is_encoded() {
        let mut cookies = CookiePreferences::default();
        cookies.set("locale", "a b;c");
        assert!(cookies.set_cookie_headers()[0].starts_with("locale=a%20b%3Bc;"));
    }

    // ==================== Session Store Tests ====================

    fn preferences(locale: &str) -> SessionPreferences {
        let mut preferences = SessionPreferences::default();
        preferences.set("locale", locale);
        preferences
    }

    #[tokio::test]
    async fn test_unknown_session_id_gets_fresh_id() {
        let store = SessionStore::default();
        let id = store.save(Some("chosen-by-client"), preferences("es")).await;

        assert_ne!(id, "chosen-by-client");
        assert!(store.load("chosen-by-client").await.is_none());
        assert_eq!(
            store.load(&id).await.and_then(|p| p.get("locale")).as_deref(),
            Some("es")
        );
    }

    #[tokio::test]
    async fn test_known_session_id_is_kept() {
        let store = SessionStore::default();
        let id = store.save(None, preferences("es")).await;
        let again = store.save(Some(&id), preferences("fr")).await;

        assert_eq!(again, id);
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.load(&id).await.and_then(|p| p.get("locale")).as_deref(),
            Some("fr")
        );
    }

    #[tokio::test]
    async fn test_oldest_session_is_evicted() {
        let store = SessionStore::with_capacity(2);
        let first = store.save(None, preferences("en")).await;
        let second = store.save(None, preferences("es")).await;

        // Saving again makes `first` the most recent one.
        store.save(Some(&first), preferences("fr")).await;
        let third = store.save(None, preferences("fr")).await;

        assert_eq!(store.len().await, 2);
        assert!(store.load(&second).await.is_none());
        assert!(store.load(&first).await.is_some());
        assert!(store.load(&third).await.is_some());
    }

    // ==================== Error Tests ====================

    #[test]
    fn test_unsupported_locale_is_bad_request() {
        let response = ApiError::from(UnsupportedLocaleError::new("de")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
