use crate::i18n::{
    BaseUrl, LocaleDescriptor, LocaleRegistry, LocaleSession, LocaleSettings, LocaleSource,
    RouteTranslations, UnicodeLocaleMatcher,
};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    // Locales
    pub default_locale: String,
    pub supported_locales: Vec<String>,
    pub locale_aliases: Vec<(String, String)>,
    pub locales_file: Option<String>,
    pub locales_order: Vec<String>,

    // Behaviour
    pub hide_default_locale_in_url: bool,
    pub use_accept_language_header: bool,
    pub locale_detection_order: Vec<LocaleSource>,

    // Preference storage
    pub locale_session_key: String,
    pub locale_cookie_name: String,

    // URLs
    pub base_url: String,
    pub route_translations_file: Option<String>,
    pub urls_ignored: Vec<String>,
    pub http_methods_ignored: Vec<String>,

    // Server
    pub port: u16,
}

/// Locale definitions read from `LOCALES_FILE`.
///
/// ```json
/// {
///   "default_locale": "en",
///   "supported_locales": {
///     "en": {"name": "English", "native": "English", "regional": "en_GB"},
///     "ar": {"name": "Arabic", "native": "العربية", "script": "Arab"}
///   },
///   "aliases": {"en-us": "en"},
///   "locales_order": ["ar", "en"]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LocalesFile {
    #[serde(default)]
    pub default_locale: Option<String>,
    pub supported_locales: IndexMap<String, LocaleDescriptor>,
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
    #[serde(default)]
    pub locales_order: Vec<String>,
}

impl LocalesFile {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut file: LocalesFile =
            serde_json::from_str(json).context("Failed to parse locales file")?;
        for (code, descriptor) in file.supported_locales.iter_mut() {
            descriptor.code = code.clone();
        }
        Ok(file)
    }

    pub fn from_path(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read locales file {}", path))?;
        Self::from_json(&json)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Locales
            default_locale: std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string()),
            supported_locales: env_list("SUPPORTED_LOCALES")
                .unwrap_or_else(|| vec!["en".to_string(), "es".to_string(), "fr".to_string()]),
            locale_aliases: env_list("LOCALE_ALIASES")
                .unwrap_or_default()
                .iter()
                .map(String::as_str)
                .map(parse_alias)
                .collect::<Result<Vec<_>>>()?,
            locales_file: std::env::var("LOCALES_FILE").ok().filter(|v| !v.is_empty()),
            locales_order: env_list("LOCALES_ORDER").unwrap_or_default(),

            // Behaviour
            hide_default_locale_in_url: env_bool("HIDE_DEFAULT_LOCALE_IN_URL", true),
            use_accept_language_header: env_bool("USE_ACCEPT_LANGUAGE_HEADER", true),
            locale_detection_order: match env_list("LOCALE_DETECTION_ORDER") {
                Some(sources) => sources
                    .iter()
                    .map(|s| s.parse::<LocaleSource>().map_err(anyhow::Error::msg))
                    .collect::<Result<Vec<_>>>()
                    .context("Invalid LOCALE_DETECTION_ORDER")?,
                None => LocaleSource::default_detection_order(),
            },

            // Preference storage
            locale_session_key: std::env::var("LOCALE_SESSION_KEY")
                .unwrap_or_else(|_| "locale".to_string()),
            locale_cookie_name: std::env::var("LOCALE_COOKIE_NAME")
                .unwrap_or_else(|_| "locale".to_string()),

            // URLs
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            route_translations_file: std::env::var("ROUTE_TRANSLATIONS_FILE")
                .ok()
                .filter(|v| !v.is_empty()),
            urls_ignored: env_list("URLS_IGNORED").unwrap_or_default(),
            http_methods_ignored: env_list("HTTP_METHODS_IGNORED")
                .map(|methods| methods.iter().map(|m| m.to_ascii_uppercase()).collect())
                .unwrap_or_else(|| LocaleSettings::default().http_methods_ignored),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    fn locales_file(&self) -> Result<Option<LocalesFile>> {
        self.locales_file
            .as_deref()
            .map(LocalesFile::from_path)
            .transpose()
    }

    /// Build the locale registry from the locales file, or from the
    /// `SUPPORTED_LOCALES` codes when no file is configured.
    pub fn build_registry(&self) -> Result<LocaleRegistry> {
        self.registry_from(self.locales_file()?)
    }

    fn registry_from(&self, file: Option<LocalesFile>) -> Result<LocaleRegistry> {
        let registry = match file {
            Some(file) => {
                let default_locale = file
                    .default_locale
                    .unwrap_or_else(|| self.default_locale.clone());
                LocaleRegistry::load(
                    &default_locale,
                    file.supported_locales.into_values(),
                    file.aliases,
                )?
            }
            None => {
                let codes: Vec<&str> = self.supported_locales.iter().map(String::as_str).collect();
                LocaleRegistry::from_codes(
                    &self.default_locale,
                    &codes,
                    self.locale_aliases.iter().cloned(),
                )?
            }
        };

        info!(
            "Loaded {} supported locales (default: {})",
            registry.codes().count(),
            registry.default_locale()
        );
        Ok(registry)
    }

    /// Resolution settings derived from this configuration.
    pub fn settings(&self) -> Result<LocaleSettings> {
        let file_order = self
            .locales_file()?
            .map(|file| file.locales_order)
            .unwrap_or_default();
        Ok(self.settings_with(file_order))
    }

    /// Settings using `file_order` unless `LOCALES_ORDER` is set.
    fn settings_with(&self, file_order: Vec<String>) -> LocaleSettings {
        LocaleSettings {
            hide_default_locale_in_url: self.hide_default_locale_in_url,
            use_accept_language_header: self.use_accept_language_header,
            detection_order: self.locale_detection_order.clone(),
            session_key: self.locale_session_key.clone(),
            cookie_name: self.locale_cookie_name.clone(),
            locales_order: if self.locales_order.is_empty() {
                file_order
            } else {
                self.locales_order.clone()
            },
            urls_ignored: self.urls_ignored.clone(),
            http_methods_ignored: self.http_methods_ignored.clone(),
        }
    }

    /// Build the locale session served by the application.
    ///
    /// The locales file, if any, is read once and feeds both the registry
    /// and the display order.
    pub fn build_session(&self) -> Result<LocaleSession> {
        let mut file = self.locales_file()?;
        let file_order = file
            .as_mut()
            .map(|file| std::mem::take(&mut file.locales_order))
            .unwrap_or_default();
        let registry = Arc::new(self.registry_from(file)?);

        let translations = match &self.route_translations_file {
            Some(path) => RouteTranslations::from_file(path)?,
            None => RouteTranslations::new(),
        };

        let base_url = BaseUrl::new(&self.base_url)
            .with_context(|| format!("Invalid BASE_URL: {}", self.base_url))?;

        Ok(LocaleSession::new(registry, self.settings_with(file_order))
            .with_translations(translations)
            .with_url_builder(base_url)
            .with_matcher(UnicodeLocaleMatcher))
    }
}

fn env_list(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => {
                warn!("Ignoring unparseable {}={}, using {}", name, other, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_alias(pair: &str) -> Result<(String, String)> {
    let (alias, target) = pair
        .split_once('=')
        .with_context(|| format!("Invalid LOCALE_ALIASES entry '{}', expected alias=code", pair))?;
    Ok((alias.trim().to_string(), target.trim().to_string()))
}
