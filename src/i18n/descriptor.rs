//! Locale metadata: names, script, writing direction and regional code.
//!
//! A `LocaleDescriptor` is the immutable description of one supported locale.
//! Descriptors are either loaded from the locales file or taken from the
//! built-in table of well-known locales (`known_locale`).

use serde::{Deserialize, Serialize};

/// Scripts written right-to-left (ISO 15924 codes).
const RTL_SCRIPTS: [&str; 5] = ["Arab", "Hebr", "Mong", "Tfng", "Thaa"];

/// Text direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    /// Derive the direction from an ISO 15924 script code.
    ///
    /// # Example
    /// ```
    /// use locale_routing::i18n::Direction;
    ///
    /// assert_eq!(Direction::from_script("Arab"), Direction::Rtl);
    /// assert_eq!(Direction::from_script("Latn"), Direction::Ltr);
    /// ```
    pub fn from_script(script: &str) -> Direction {
        if RTL_SCRIPTS.contains(&script) {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }

    /// The HTML `dir` attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

fn default_script() -> String {
    "Latn".to_string()
}

/// Metadata for a supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleDescriptor {
    /// Locale code as used in URLs and configuration (e.g., "en", "pt-BR")
    #[serde(default)]
    pub code: String,

    /// English name (e.g., "Spanish")
    pub name: String,

    /// Name in the locale's own language (e.g., "Español")
    pub native: String,

    /// ISO 15924 script code (e.g., "Latn", "Arab")
    #[serde(default = "default_script")]
    pub script: String,

    /// Explicit direction; derived from `script` when absent
    #[serde(default, rename = "dir", skip_serializing_if = "Option::is_none")]
    pub dir: Option<Direction>,

    /// POSIX-style regional code (e.g., "es_ES")
    #[serde(default)]
    pub regional: String,
}

impl LocaleDescriptor {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        native: impl Into<String>,
        script: impl Into<String>,
        regional: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            native: native.into(),
            script: script.into(),
            dir: None,
            regional: regional.into(),
        }
    }

    /// Set an explicit direction, overriding the script-derived one.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.dir = Some(direction);
        self
    }

    /// Descriptor used for codes the registry knows nothing about.
    pub fn fallback(code: &str) -> Self {
        Self::new(code, code, code, "Latn", "")
    }

    /// Effective text direction.
    pub fn direction(&self) -> Direction {
        self.dir
            .unwrap_or_else(|| Direction::from_script(&self.script))
    }

    /// Lower-cased primary language subtag of the code ("pt-BR" -> "pt").
    pub fn language(&self) -> String {
        self.code
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }
}

/// Look up a well-known locale by code.
///
/// Lets configuration name locales by bare code instead of spelling out every
/// descriptor field.
pub fn known_locale(code: &str) -> Option<LocaleDescriptor> {
    KNOWN_LOCALES
        .iter()
        .find(|(c, ..)| *c == code)
        .map(|(code, name, native, script, regional)| {
            LocaleDescriptor::new(*code, *name, *native, *script, *regional)
        })
}

/// (code, name, native, script, regional)
const KNOWN_LOCALES: &[(&str, &str, &str, &str, &str)] = &[
    ("en", "English", "English", "Latn", "en_GB"),
    ("en-US", "American English", "American English", "Latn", "en_US"),
    ("es", "Spanish", "Español", "Latn", "es_ES"),
    ("fr", "French", "Français", "Latn", "fr_FR"),
    ("de", "German", "Deutsch", "Latn", "de_DE"),
    ("it", "Italian", "Italiano", "Latn", "it_IT"),
    ("pt", "Portuguese", "Português", "Latn", "pt_PT"),
    ("pt-BR", "Brazilian Portuguese", "Português do Brasil", "Latn", "pt_BR"),
    ("nl", "Dutch", "Nederlands", "Latn", "nl_NL"),
    ("ru", "Russian", "Русский", "Cyrl", "ru_RU"),
    ("ja", "Japanese", "日本語", "Jpan", "ja_JP"),
    ("zh", "Chinese (Simplified)", "简体中文", "Hans", "zh_CN"),
    ("ar", "Arabic", "العربية", "Arab", "ar_AE"),
    ("he", "Hebrew", "עברית", "Hebr", "he_IL"),
    ("fa", "Persian", "فارسی", "Arab", "fa_IR"),
    ("dv", "Divehi", "ދިވެހިބަސް", "Thaa", "dv_MV"),
];

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Direction Tests ====================

    #[test]
    fn test_rtl_scripts() {
        for script in ["Arab", "Hebr", "Mong", "Tfng", "Thaa"] {
            assert_eq!(Direction::from_script(script), Direction::Rtl, "{}", script);
        }
    }

    #[test]
    fn test_ltr_scripts() {
        for script in ["Latn", "Cyrl", "Jpan", "Hans", ""] {
            assert_eq!(Direction::from_script(script), Direction::Ltr, "{}", script);
        }
    }

    #[test]
    fn test_explicit_direction_overrides_script() {
        let descriptor =
            LocaleDescriptor::new("xx", "Test", "Test", "Latn", "").with_direction(Direction::Rtl);
        assert_eq!(descriptor.direction(), Direction::Rtl);

        let descriptor =
            LocaleDescriptor::new("ar", "Arabic", "العربية", "Arab", "").with_direction(Direction::Ltr);
        assert_eq!(descriptor.direction(), Direction::Ltr);
    }

    #[test]
    fn test_direction_as_str() {
        assert_eq!(Direction::Ltr.as_str(), "ltr");
        assert_eq!(Direction::Rtl.as_str(), "rtl");
    }

    // ==================== Descriptor Tests ====================

    #[test]
    fn test_fallback_descriptor() {
        let descriptor = LocaleDescriptor::fallback("xx");
        assert_eq!(descriptor.code, "xx");
        assert_eq!(descriptor.name, "xx");
        assert_eq!(descriptor.native, "xx");
        assert_eq!(descriptor.script, "Latn");
        assert_eq!(descriptor.direction(), Direction::Ltr);
    }

    #[test]
    fn test_language_subtag() {
        assert_eq!(known_locale("pt-BR").unwrap().language(), "pt");
        assert_eq!(known_locale("es").unwrap().language(), "es");
        assert_eq!(LocaleDescriptor::fallback("ZH_hant").language(), "zh");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"name": "Hebrew", "native": "עברית", "script": "Hebr"}"#;
        let descriptor: LocaleDescriptor = serde_json::from_str(json).expect("Should parse");
        assert_eq!(descriptor.code, "");
        assert_eq!(descriptor.direction(), Direction::Rtl);
        assert_eq!(descriptor.regional, "");

        let json = r#"{"name": "Klingon", "native": "tlhIngan Hol", "dir": "rtl"}"#;
        let descriptor: LocaleDescriptor = serde_json::from_str(json).expect("Should parse");
        assert_eq!(descriptor.script, "Latn");
        assert_eq!(descriptor.direction(), Direction::Rtl);
    }

    // ==================== Known Locale Tests ====================

    #[test]
    fn test_known_locale_lookup() {
        let spanish = known_locale("es").expect("Spanish is built in");
        assert_eq!(spanish.native, "Español");
        assert_eq!(spanish.regional, "es_ES");

        let arabic = known_locale("ar").expect("Arabic is built in");
        assert_eq!(arabic.direction(), Direction::Rtl);

        assert!(known_locale("tlh").is_none());
    }

    #[test]
    fn test_known_locales_codes_are_unique() {
        let mut codes: Vec<_> = KNOWN_LOCALES.iter().map(|(c, ..)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), KNOWN_LOCALES.len());
    }
}
