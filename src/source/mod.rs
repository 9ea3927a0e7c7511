//! Source adapters: per-source extraction of raw article candidates.
//!
//! Two adapter kinds exist, dispatched through the [`Source`] enum:
//!
//! - [`html_index`]: pattern-matches anchor elements on paginated HTML
//!   listing pages
//! - [`feed`]: walks RSS/Atom item elements
//!
//! Both produce [`RawCandidate`](crate::model::RawCandidate) values and
//! contain their own failures: a dead page, a 500, or an unparseable payload
//! is logged and contributes zero candidates. Nothing at this layer aborts a
//! run.

pub mod client;
pub mod feed;
pub mod html_index;

pub use client::{build_client, FetchError};

use std::time::Duration;

use crate::config::{Config, FeedSource, HtmlSource};
use crate::model::RawCandidate;

/// A configured source, either adapter kind.
#[derive(Debug, Clone)]
pub enum Source {
    HtmlIndex(HtmlSource),
    Feed(FeedSource),
}

impl Source {
    pub fn name(&self) -> &str {
        match self {
            Source::HtmlIndex(s) => &s.name,
            Source::Feed(s) => &s.name,
        }
    }

    /// Run this source's extraction to completion.
    pub async fn extract(
        &self,
        client: &reqwest::Client,
        page_delay: Duration,
    ) -> Vec<RawCandidate> {
        match self {
            Source::HtmlIndex(s) => html_index::extract(client, s, page_delay).await,
            Source::Feed(s) => feed::extract(client, s).await,
        }
    }
}

/// All sources from the configuration, HTML-index sources first.
pub fn from_config(config: &Config) -> Vec<Source> {
    config
        .html_sources
        .iter()
        .cloned()
        .map(Source::HtmlIndex)
        .chain(config.feed_sources.iter().cloned().map(Source::Feed))
        .collect()
}
