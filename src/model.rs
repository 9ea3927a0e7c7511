//! Core record types flowing through the pipeline.
//!
//! Extraction produces [`RawCandidate`] values, the date normalizer turns
//! each surviving candidate into a [`NormalizedArticle`], and the storage
//! layer persists those as rows keyed by URL uniqueness. Candidates that
//! fail the validity checks are discarded at extraction time and never
//! constructed.

use chrono::NaiveDateTime;
use url::Url;

/// Minimum headline length for HTML-index candidates.
///
/// Index pages link navigation chrome ("Next", "Lihat Semua") with the same
/// anchor markup as articles; anything this short is not a headline.
pub const MIN_TITLE_LEN: usize = 15;

/// An extracted but not-yet-normalized article record.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    /// Identifier of the originating source (config source name).
    pub source: String,
    /// Extracted headline text.
    pub title: String,
    /// Canonical article link, tracking query parameters stripped.
    pub url: String,
    /// Free-form textual timestamp as found in the payload, if any.
    pub raw_date: Option<String>,
    /// When the pipeline extracted this candidate (not a source field).
    pub scraped_at: NaiveDateTime,
}

/// A candidate with its publication timestamp resolved to a canonical value.
///
/// Created once per surviving [`RawCandidate`]; immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedArticle {
    pub source: String,
    pub title: String,
    pub url: String,
    /// Second precision, no timezone offset retained.
    pub published_at: NaiveDateTime,
    pub scraped_at: NaiveDateTime,
}

/// Strip tracking query parameters and fragments from an article link.
///
/// The URL is the natural key of the store, so `?utm_source=...` variants of
/// the same permalink must collapse to one value. Falls back to a plain
/// string split when the link is not an absolute URL.
pub fn canonical_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw
            .split(['?', '#'])
            .next()
            .unwrap_or(raw)
            .to_string(),
    }
}
