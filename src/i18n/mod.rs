//! Locale negotiation and URL localization.
//!
//! This module holds everything that decides which locale a request is served
//! in and how URLs carry that locale.
//!
//! # Architecture
//!
//! - `registry`: Supported locales, the default locale and aliases (read-only after load)
//! - `descriptor`: Locale metadata and the built-in table of well-known locales
//! - `negotiator`: Accept-Language parsing and matching
//! - `routes`: Translated route patterns and placeholder substitution
//! - `url_localizer`: Inserting, replacing and stripping locale segments in URLs
//! - `session`: Per-request resolution (segment → session → cookie → header → default)
//! - `state`: Per-request locale state
//! - `metrics`: Resolution counters
//!
//! # Example
//!
//! ```rust
//! use locale_routing::i18n::{LanguageNegotiator, LocaleRegistry};
//! use std::sync::Arc;
//!
//! let registry = LocaleRegistry::from_codes("en", &["en", "fr", "es"], [("en-us", "en")])?;
//! let negotiator = LanguageNegotiator::new(Arc::new(registry));
//!
//! assert_eq!(negotiator.negotiate(Some("fr-FR,fr;q=0.9,en;q=0.8")), "fr");
//! assert_eq!(negotiator.negotiate(None), "en");
//! # Ok::<(), locale_routing::i18n::ConfigurationError>(())
//! ```

mod descriptor;
mod error;
mod metrics;
mod negotiator;
mod registry;
mod routes;
mod session;
mod state;
mod url_localizer;

pub use descriptor::{known_locale, Direction, LocaleDescriptor};
pub use error::{ConfigurationError, UnsupportedLocaleError};
pub use metrics::{MetricsReport, ResolutionMetrics};
pub use negotiator::{
    parse_accept_language, AcceptLanguageEntry, LanguageNegotiator, LocaleMatcher,
    NoLocaleMatcher, UnicodeLocaleMatcher,
};
pub use registry::LocaleRegistry;
pub use routes::{
    encode_path_segment, find_translated_route, match_pattern, substitute_attributes,
    RouteAttributes, RouteTranslations, TranslationLookup,
};
pub use session::{LocaleSession, LocaleSettings, PreferenceStore, RequestAccessor};
pub use state::{LocaleSource, RequestLocaleState};
pub use url_localizer::{is_absolute, BaseUrl, UrlBuilder, UrlLocalizer};
