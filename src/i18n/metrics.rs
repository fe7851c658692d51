//! Locale resolution metrics.
//!
//! Counts how request locales were chosen, how many requests were redirected
//! to their canonical URL, and how many localization calls named an
//! unsupported locale.

use crate::i18n::LocaleSource;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters shared by all requests served by one `LocaleSession`.
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    from_segment: AtomicUsize,
    from_session: AtomicUsize,
    from_cookie: AtomicUsize,
    from_header: AtomicUsize,
    from_explicit: AtomicUsize,
    from_default: AtomicUsize,

    /// Requests answered with a redirect to the canonical URL
    redirects: AtomicUsize,

    /// Localization calls rejected for naming an unsupported locale
    unsupported_locales: AtomicUsize,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, source: LocaleSource) -> &AtomicUsize {
        match source {
            LocaleSource::Segment => &self.from_segment,
            LocaleSource::Session => &self.from_session,
            LocaleSource::Cookie => &self.from_cookie,
            LocaleSource::Header => &self.from_header,
            LocaleSource::Explicit => &self.from_explicit,
            LocaleSource::Default => &self.from_default,
        }
    }

    /// Record that a request's locale came from `source`.
    pub fn record_resolution(&self, source: LocaleSource) {
        self.counter(source).fetch_add(1, Ordering::Relaxed);
    }

    /// Record a redirect to a canonical URL.
    pub fn record_redirect(&self) {
        self.redirects.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a localization call rejected for an unsupported locale.
    pub fn record_unsupported_locale(&self) {
        self.unsupported_locales.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of resolutions that came from `source`.
    pub fn resolutions(&self, source: LocaleSource) -> usize {
        self.counter(source).load(Ordering::Relaxed)
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::Relaxed)
    }

    pub fn unsupported_locales(&self) -> usize {
        self.unsupported_locales.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let segment = self.resolutions(LocaleSource::Segment);
        let session = self.resolutions(LocaleSource::Session);
        let cookie = self.resolutions(LocaleSource::Cookie);
        let header = self.resolutions(LocaleSource::Header);
        let explicit = self.resolutions(LocaleSource::Explicit);
        let default = self.resolutions(LocaleSource::Default);

        let total = segment + session + cookie + header + explicit + default;
        let negotiated_rate = if total > 0 {
            (header as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            total_resolutions: total,
            from_segment: segment,
            from_session: session,
            from_cookie: cookie,
            from_header: header,
            from_explicit: explicit,
            from_default: default,
            negotiated_rate,
            redirects: self.redirects(),
            unsupported_locales: self.unsupported_locales(),
        }
    }
}

/// Snapshot of resolution statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub total_resolutions: usize,
    pub from_segment: usize,
    pub from_session: usize,
    pub from_cookie: usize,
    pub from_header: usize,
    pub from_explicit: usize,
    pub from_default: usize,

    /// Share of resolutions decided by Accept-Language negotiation (0-100)
    pub negotiated_rate: f64,

    pub redirects: usize,
    pub unsupported_locales: usize,
}
