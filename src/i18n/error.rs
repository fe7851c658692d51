//! Error types for locale configuration and URL localization.

use thiserror::Error;

/// Reasons a locale registry could not be built from configuration.
///
/// These are start-up failures: the service should refuse to serve
/// localized routes until the configuration is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The configured default locale is not among the supported locales.
    #[error("default locale '{locale}' is not in the supported locales")]
    UnsupportedDefaultLocale {
        /// The rejected default locale.
        locale: String,
    },
    /// No supported locales were configured.
    #[error("at least one supported locale must be configured")]
    NoSupportedLocales,
    /// An alias points at a locale that is not supported.
    #[error("alias '{alias}' maps to unsupported locale '{target}'")]
    DanglingAlias {
        /// The alias as configured.
        alias: String,
        /// The canonical code it was mapped to.
        target: String,
    },
    /// A bare locale code has no built-in descriptor to fill in its metadata.
    #[error("no built-in metadata for locale '{code}'; describe it in the locales file")]
    UnknownLocale {
        /// The code that could not be described.
        code: String,
    },
}

/// A URL localization call named a locale that does not resolve, directly or
/// through an alias, to a supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("locale '{locale}' is not supported")]
pub struct UnsupportedLocaleError {
    /// The locale code as requested by the caller.
    pub locale: String,
}

impl UnsupportedLocaleError {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }
}
