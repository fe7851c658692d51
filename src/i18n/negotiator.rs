//! Accept-Language negotiation.
//!
//! Parses an `Accept-Language` header into ranked candidates and picks the
//! best supported locale. Negotiation never fails: malformed headers and
//! headers with no usable match degrade to the default locale.

use crate::i18n::LocaleRegistry;
use std::sync::Arc;
use tracing::debug;
use unic_langid::LanguageIdentifier;

/// One ranked candidate from an `Accept-Language` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptLanguageEntry {
    /// Language tag as sent by the client (e.g., "en-US", "*")
    pub tag: String,
    /// Quality factor in [0, 1]
    pub quality: f32,
}

impl AcceptLanguageEntry {
    fn new(tag: impl Into<String>, quality: f32) -> Self {
        Self {
            tag: tag.into(),
            quality,
        }
    }

    fn is_wildcard(&self) -> bool {
        self.tag == "*"
    }
}

/// Parse an `Accept-Language` header into candidates ranked by quality.
///
/// Tags with subtags also contribute their shorter prefixes (`en-US` adds
/// `en`) at the same quality, unless the prefix is listed explicitly in the
/// header. Ties keep header order.
///
/// # Example
/// ```
/// use locale_routing::i18n::parse_accept_language;
///
/// let ranked = parse_accept_language("fr-CH, fr;q=0.9, en;q=0.8");
/// let tags: Vec<_> = ranked.iter().map(|e| e.tag.as_str()).collect();
/// assert_eq!(tags, vec!["fr-CH", "fr", "en"]);
/// ```
pub fn parse_accept_language(header: &str) -> Vec<AcceptLanguageEntry> {
    let mut explicit: Vec<AcceptLanguageEntry> = Vec::new();

    for segment in header.split(',') {
        let mut parts = segment.split(';').map(str::trim);
        let tag = parts.next().unwrap_or_default();
        if tag.is_empty() {
            continue;
        }

        let quality = parts
            .find_map(parse_quality)
            .unwrap_or_else(|| default_quality(tag));

        match explicit.iter_mut().find(|e| e.tag.eq_ignore_ascii_case(tag)) {
            Some(existing) => existing.quality = quality,
            None => explicit.push(AcceptLanguageEntry::new(tag, quality)),
        }
    }

    let mut candidates: Vec<AcceptLanguageEntry> = Vec::with_capacity(explicit.len() * 2);
    for entry in &explicit {
        candidates.push(entry.clone());

        let mut prefix = entry.tag.as_str();
        while let Some((head, _)) = prefix.rsplit_once('-') {
            prefix = head;
            if prefix.is_empty() || explicit.iter().any(|e| e.tag.eq_ignore_ascii_case(prefix)) {
                continue;
            }
            match candidates
                .iter_mut()
                .find(|c| c.tag.eq_ignore_ascii_case(prefix))
            {
                Some(derived) if derived.quality < entry.quality => derived.quality = entry.quality,
                Some(_) => {}
                None => candidates.push(AcceptLanguageEntry::new(prefix, entry.quality)),
            }
        }
    }

    // sort_by is stable: equal qualities keep header order
    candidates.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    candidates
}

/// Parse a `q=<float>` parameter. Non-numeric or non-finite values count as
/// absent.
fn parse_quality(param: &str) -> Option<f32> {
    let (key, value) = param.split_once('=')?;
    if !key.trim().eq_ignore_ascii_case("q") {
        return None;
    }
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|q| q.is_finite())
        .map(|q| q.clamp(0.0, 1.0))
}

/// Quality for a tag without an explicit factor.
fn default_quality(tag: &str) -> f32 {
    if tag == "*/*" {
        0.01
    } else if tag.ends_with('*') {
        0.02
    } else {
        1.0
    }
}

/// Optional extra matching capability consulted after the built-in rules.
///
/// Implementations receive the raw header and the supported codes in
/// configured order, and may return a supported code. Anything they return
/// that is not supported is ignored.
pub trait LocaleMatcher: Send + Sync {
    fn best_match(&self, accept_language: &str, supported: &[&str]) -> Option<String>;
}

/// Matcher that never matches. The negotiator's default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLocaleMatcher;

impl LocaleMatcher for NoLocaleMatcher {
    fn best_match(&self, _accept_language: &str, _supported: &[&str]) -> Option<String> {
        None
    }
}

/// Matcher backed by `unic-langid` range matching.
///
/// Treats both the requested and the supported identifiers as ranges, so
/// `zh-Hant-TW` can land on a supported `zh` and `sr` on a supported
/// `sr-Latn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeLocaleMatcher;

impl LocaleMatcher for UnicodeLocaleMatcher {
    fn best_match(&self, accept_language: &str, supported: &[&str]) -> Option<String> {
        let available: Vec<(&str, LanguageIdentifier)> = supported
            .iter()
            .filter_map(|code| {
                code.replace('_', "-")
                    .parse::<LanguageIdentifier>()
                    .ok()
                    .map(|id| (*code, id))
            })
            .collect();

        parse_accept_language(accept_language)
            .iter()
            .filter(|entry| !entry.is_wildcard())
            .filter_map(|entry| entry.tag.replace('_', "-").parse::<LanguageIdentifier>().ok())
            .find_map(|requested| {
                available
                    .iter()
                    .find(|(_, id)| id.matches(&requested, true, true))
                    .map(|(code, _)| code.to_string())
            })
    }
}

/// Picks the best supported locale for a request.
pub struct LanguageNegotiator {
    registry: Arc<LocaleRegistry>,
    matcher: Box<dyn LocaleMatcher>,
}

impl LanguageNegotiator {
    pub fn new(registry: Arc<LocaleRegistry>) -> Self {
        Self {
            registry,
            matcher: Box::new(NoLocaleMatcher),
        }
    }

    /// Install an extra matching pass, consulted when the built-in rules find
    /// nothing.
    pub fn with_matcher(mut self, matcher: impl LocaleMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    /// Negotiate a locale from an `Accept-Language` header.
    ///
    /// # Returns
    /// A supported locale code; the default locale when the header is absent,
    /// empty, malformed or matches nothing.
    pub fn negotiate(&self, accept_language: Option<&str>) -> String {
        self.negotiate_with_host(accept_language, None)
    }

    /// Negotiate from the header, then try the client's remote host name.
    ///
    /// The host fallback takes the last dot-separated label (`client.example.fr`
    /// gives `fr`) and accepts it when it is a supported code.
    pub fn negotiate_with_host(
        &self,
        accept_language: Option<&str>,
        remote_host: Option<&str>,
    ) -> String {
        self.best_match(accept_language, remote_host)
            .unwrap_or_else(|| self.registry.default_locale().to_string())
    }

    /// Like `negotiate_with_host`, but `None` when nothing matched instead of
    /// the default locale.
    pub fn best_match(
        &self,
        accept_language: Option<&str>,
        remote_host: Option<&str>,
    ) -> Option<String> {
        let header = accept_language.map(str::trim).filter(|h| !h.is_empty());

        if let Some(code) = header.and_then(|h| self.match_header(h)) {
            return Some(code);
        }

        let code = remote_host.and_then(|h| self.match_remote_host(h))?;
        debug!("Negotiated '{}' from remote host", code);
        Some(code)
    }

    fn match_header(&self, header: &str) -> Option<String> {
        let candidates = parse_accept_language(header);
        let mut saw_wildcard = false;

        for candidate in &candidates {
            if candidate.is_wildcard() {
                saw_wildcard = true;
                continue;
            }

            if let Some(code) = self.match_tag(&candidate.tag) {
                debug!(
                    "Negotiated '{}' from tag '{}' (q={})",
                    code, candidate.tag, candidate.quality
                );
                return Some(code);
            }
        }

        if saw_wildcard {
            let first = &self.registry.first().code;
            debug!("Negotiated '{}' from wildcard", first);
            return Some(first.clone());
        }

        let supported: Vec<&str> = self.registry.codes().collect();
        self.matcher
            .best_match(header, &supported)
            .and_then(|code| self.registry.canonical(&code).map(str::to_string))
    }

    fn match_tag(&self, tag: &str) -> Option<String> {
        let resolved = self.registry.resolve_alias(tag);
        if let Some(descriptor) = self.registry.get(resolved) {
            return Some(descriptor.code.clone());
        }

        let wanted = normalize_tag(resolved);
        self.registry
            .supported()
            .find(|descriptor| {
                (!descriptor.regional.is_empty() && normalize_tag(&descriptor.regional) == wanted)
                    || descriptor.language() == wanted
            })
            .map(|descriptor| descriptor.code.clone())
    }

    fn match_remote_host(&self, remote_host: &str) -> Option<String> {
        let label = remote_host
            .trim_end_matches('.')
            .rsplit('.')
            .next()?
            .to_ascii_lowercase();
        self.registry.canonical(&label).map(str::to_string)
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.replace('_', "-").to_ascii_lowercase()
}
