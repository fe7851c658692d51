//! Per-request locale state.
//!
//! Each request owns one `RequestLocaleState`. Nothing in it is shared
//! between requests, so handlers never need to lock it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the request's locale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleSource {
    /// Locale segment in the URL path
    Segment,
    /// Preference stored in the session
    Session,
    /// Preference stored in a cookie
    Cookie,
    /// Accept-Language negotiation (or its remote-host fallback)
    Header,
    /// Set explicitly by application code
    Explicit,
    /// Nothing matched; the configured default
    #[default]
    Default,
}

impl LocaleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocaleSource::Segment => "segment",
            LocaleSource::Session => "session",
            LocaleSource::Cookie => "cookie",
            LocaleSource::Header => "header",
            LocaleSource::Explicit => "explicit",
            LocaleSource::Default => "default",
        }
    }

    /// The lookup order used when none is configured.
    pub fn default_detection_order() -> Vec<LocaleSource> {
        vec![
            LocaleSource::Segment,
            LocaleSource::Session,
            LocaleSource::Cookie,
            LocaleSource::Header,
        ]
    }
}

impl fmt::Display for LocaleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocaleSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "segment" | "url" => Ok(LocaleSource::Segment),
            "session" => Ok(LocaleSource::Session),
            "cookie" => Ok(LocaleSource::Cookie),
            "header" | "accept-language" => Ok(LocaleSource::Header),
            other => Err(format!("unknown locale source '{}'", other)),
        }
    }
}

/// Locale state for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestLocaleState {
    /// Canonical code of the locale serving this request
    pub current_locale: String,

    /// How `current_locale` was chosen
    pub source: LocaleSource,

    /// Full URL of the request, used when localizing without an explicit URL
    pub current_url: String,

    /// Base URL used instead of the configured one when building URLs
    pub base_url_override: Option<String>,

    /// Route key to localize against instead of the literal current URL
    pub active_route_name: Option<String>,
}

impl RequestLocaleState {
    pub fn new(current_locale: impl Into<String>, current_url: impl Into<String>) -> Self {
        Self {
            current_locale: current_locale.into(),
            source: LocaleSource::Default,
            current_url: current_url.into(),
            base_url_override: None,
            active_route_name: None,
        }
    }

    /// Build URLs against `base_url` for the rest of this request.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url_override = Some(base_url.into());
    }

    /// Localize relative to a translated route rather than the current URL.
    pub fn set_route_name(&mut self, route_name: impl Into<String>) {
        self.active_route_name = Some(route_name.into());
    }
}
